//! BUDE Configuration Module
//!
//! Layers, lowest priority first: built-in defaults, an optional TOML file,
//! then command-line flags. The resolved [`RunConfiguration`] is built once
//! per run and not modified afterwards.

use bude_core::types::{DEFAULT_DECK_DIR, DEFAULT_ITERATIONS, DEFAULT_POSES, DEFAULT_WG_SIZE};
use bude_core::{BudeError, Result};
use bude_gpu::{Device, DeviceRegistry, Selection, SelectionRule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::args::Args;

/// Run options as read from a TOML file.
///
/// ```toml
/// iterations = 8
/// poses = 65536
/// wg_size = 4
/// deck = "../data/bm1"
/// device = "serial"
/// telemetry_path = "bude_runs.jsonl"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    #[serde(default = "default_poses")]
    pub poses: usize,

    #[serde(default = "default_wg_size")]
    pub wg_size: usize,

    #[serde(default = "default_deck")]
    pub deck: PathBuf,

    /// Index or name substring; the first device when unset
    #[serde(default)]
    pub device: Option<String>,

    #[serde(default)]
    pub telemetry_path: Option<PathBuf>,
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn default_poses() -> usize {
    DEFAULT_POSES
}

fn default_wg_size() -> usize {
    DEFAULT_WG_SIZE
}

fn default_deck() -> PathBuf {
    PathBuf::from(DEFAULT_DECK_DIR)
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            poses: DEFAULT_POSES,
            wg_size: DEFAULT_WG_SIZE,
            deck: default_deck(),
            device: None,
            telemetry_path: None,
        }
    }
}

impl BenchConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| BudeError::io(path, source))?;
        Self::from_str(&content)
            .map_err(|e| BudeError::config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BudeError::config(e.to_string()))
    }

    /// Defaults, overlaid with the `--config` file when one is given.
    pub fn load(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => {
                log::info!("Reading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply(args);
        Ok(config)
    }

    /// Overrides fields with every flag present in `args`.
    pub fn apply(&mut self, args: &Args) {
        if let Some(iterations) = args.iterations {
            self.iterations = iterations;
        }
        if let Some(poses) = args.numposes {
            self.poses = poses;
        }
        if let Some(wg_size) = args.wgsize {
            self.wg_size = wg_size;
        }
        if let Some(deck) = &args.deck {
            self.deck = deck.clone();
        }
        if let Some(device) = &args.device {
            self.device = Some(device.clone());
        }
        if let Some(path) = &args.telemetry {
            self.telemetry_path = Some(path.clone());
        }
    }
}

/// Fully resolved options for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    pub iterations: usize,
    pub poses: usize,
    /// 0 means ungrouped dispatch
    pub wg_size: usize,
    pub deck_dir: PathBuf,
    pub device_index: usize,
    pub device: Device,
}

impl RunConfiguration {
    /// Validates `config` and binds it to a device from `registry`.
    pub fn resolve(config: &BenchConfig, registry: &DeviceRegistry) -> Result<(Self, Selection)> {
        if config.iterations == 0 {
            return Err(BudeError::config("iterations must be at least 1"));
        }

        let selection = match &config.device {
            Some(selector) => registry.select(selector)?,
            None => Selection {
                index: 0,
                rule: SelectionRule::Index,
            },
        };
        let device = registry
            .get(selection.index)
            .cloned()
            .ok_or_else(|| BudeError::NoMatchingDevice(selection.index.to_string()))?;

        log::debug!(
            "Resolved device {} ({}) via {:?}",
            selection.index,
            device.name(),
            selection.rule
        );

        Ok((
            Self {
                iterations: config.iterations,
                poses: config.poses,
                wg_size: config.wg_size,
                deck_dir: config.deck.clone(),
                device_index: selection.index,
                device,
            },
            selection,
        ))
    }

    /// Whether the kernel is launched in work-groups.
    pub fn grouped(&self) -> bool {
        self.wg_size > 0
    }
}
