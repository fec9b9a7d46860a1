//! Error types for the BUDE benchmark.
//!
//! Every fault in the harness is terminal for the current run, so there is no
//! retry classification here. The variants exist so callers can tell a user
//! input fault from a bad deck or a short reference file.

use std::path::{Path, PathBuf};
use thiserror::Error;

const BAD_POSES: &str = "Bad poses";

/// Unified error type for deck loading, device handling and validation.
#[derive(Error, Debug)]
pub enum BudeError {
    /// A deck or reference file could not be opened or read
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Deck contents disagree with the run configuration
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal consistency failure detected after the run (e.g. reference data ran out)
    #[error("Logic error: {0}")]
    Logic(String),

    /// Configuration values that cannot drive a run
    #[error("Configuration error: {0}")]
    Config(String),

    /// Device enumeration returned nothing
    #[error("No devices available")]
    NoDevices,

    /// A device selector matched nothing and there is more than one candidate
    #[error("No matching devices for selector `{0}`")]
    NoMatchingDevice(String),

    /// Queue, allocation or kernel failures
    #[error("Device error in {context}: {message}")]
    Device { context: String, message: String },

    /// Shared allocation would exceed the device capacity
    #[error("Shared memory exhausted: {requested} bytes requested, {live} of {capacity} live")]
    SharedMemoryExhausted {
        requested: usize,
        live: usize,
        capacity: usize,
    },
}

impl BudeError {
    /// Creates an I/O error bound to the offending path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        BudeError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        BudeError::InvalidArgument(message.into())
    }

    /// Creates the invalid-argument error for a pose file that does not hold
    /// `poses` poses of `per_pose` values each.
    pub fn pose_mismatch(values: usize, per_pose: usize, poses: usize) -> Self {
        BudeError::InvalidArgument(format!(
            "{}: {} values in pose file ({} per pose), expected {} poses",
            BAD_POSES, values, per_pose, poses
        ))
    }

    /// Creates a logic error.
    pub fn logic(message: impl Into<String>) -> Self {
        BudeError::Logic(message.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        BudeError::Config(message.into())
    }

    /// Creates a device error with context.
    pub fn device(context: impl Into<String>, message: impl Into<String>) -> Self {
        BudeError::Device {
            context: context.into(),
            message: message.into(),
        }
    }

    /// True for faults that stem from user input before any device work.
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            BudeError::Config(_) | BudeError::NoDevices | BudeError::NoMatchingDevice(_)
        )
    }

    /// Returns a user-friendly error message with actionable guidance.
    pub fn user_message(&self) -> String {
        match self {
            BudeError::Io { path, source } => {
                format!(
                    "Bad file: {} ({})\n\
                     → Check the --deck directory; it must contain ligand.in, protein.in,\n\
                     → forcefield.in, poses.in and ref_energies.out.",
                    path.display(),
                    source
                )
            }
            BudeError::InvalidArgument(msg) if msg.starts_with(BAD_POSES) => {
                format!(
                    "Invalid argument: {}\n\
                     → --numposes must match the number of poses stored in the deck.",
                    msg
                )
            }
            BudeError::NoDevices => "No devices available!\n\
                 → At least one execution device is required to run the benchmark."
                .to_string(),
            BudeError::NoMatchingDevice(selector) => {
                format!(
                    "No matching devices for `{}`\n\
                     → Run with --list and pass an index or a substring of a device name.",
                    selector
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for BUDE operations.
pub type Result<T> = std::result::Result<T, BudeError>;
