//! Checks computed energies against a deck's reference energies.
//!
//! The check only reports the worst relative difference; it never rejects a
//! run. Callers that need a gate use [`ValidationReport::within`].

use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{BudeError, Result};
use crate::types::REF_POSES;

/// Pairs where both magnitudes fall below this are not compared.
pub const NEAR_ZERO: f32 = 1.0;

/// Reference energies, one value per line of the reference file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEnergies {
    values: Vec<f32>,
}

impl ReferenceEnergies {
    /// Number of reference lines needed to validate `poses` poses.
    pub fn required_count(poses: usize) -> usize {
        poses.min(REF_POSES)
    }

    /// Reads exactly `required` values from the file at `path`.
    pub fn read(path: &Path, required: usize) -> Result<Self> {
        let file = File::open(path).map_err(|source| BudeError::io(path, source))?;
        Self::from_reader(BufReader::new(file), required)
            .map_err(|e| match e {
                BudeError::Io { source, .. } => BudeError::io(path, source),
                other => other,
            })
    }

    /// Reads exactly `required` values from `reader`; extra lines are ignored.
    ///
    /// Running out of lines is a `Logic` error, an unparsable line an
    /// `InvalidArgument` error.
    pub fn from_reader<R: BufRead>(reader: R, required: usize) -> Result<Self> {
        let mut values = Vec::with_capacity(required);
        let mut lines = reader.lines();

        for index in 0..required {
            let line = match lines.next() {
                Some(line) => line.map_err(|source| BudeError::io("<reference>", source))?,
                None => {
                    return Err(BudeError::logic(format!(
                        "ran out of ref energies lines to verify ({} of {} read)",
                        index, required
                    )))
                }
            };
            let value = line.trim().parse::<f32>().map_err(|e| {
                BudeError::invalid_argument(format!(
                    "reference energy on line {} is not a number (`{}`): {}",
                    index + 1,
                    line.trim(),
                    e
                ))
            })?;
            values.push(value);
        }

        Ok(Self { values })
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Compares these references against the leading `computed` energies.
    pub fn compare(&self, computed: &[f32]) -> ValidationReport {
        compare(&self.values, computed)
    }
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Pairs that contributed to the maximum
    pub compared: usize,
    /// Near-zero pairs left out
    pub skipped: usize,
    /// Largest relative difference seen, as a fraction
    pub max_relative_diff: f32,
}

impl ValidationReport {
    pub fn max_difference_percent(&self) -> f32 {
        100.0 * self.max_relative_diff
    }

    /// True when the worst difference is at most `tolerance_percent`.
    pub fn within(&self, tolerance_percent: f32) -> bool {
        self.max_difference_percent() <= tolerance_percent
    }
}

/// Maximum relative difference over index-aligned pairs.
///
/// A pair is skipped when both `|reference|` and `|computed|` are below
/// [`NEAR_ZERO`]. The difference is `|reference - computed| / reference`, so a
/// negative reference yields a negative difference that never raises the
/// maximum.
pub fn compare(reference: &[f32], computed: &[f32]) -> ValidationReport {
    let mut report = ValidationReport {
        compared: 0,
        skipped: 0,
        max_relative_diff: 0.0,
    };

    for (&expected, &actual) in reference.iter().zip(computed) {
        if expected.abs() < NEAR_ZERO && actual.abs() < NEAR_ZERO {
            report.skipped += 1;
            continue;
        }

        let diff = (expected - actual).abs() / expected;
        if diff > report.max_relative_diff {
            report.max_relative_diff = diff;
        }
        report.compared += 1;
    }

    report
}
