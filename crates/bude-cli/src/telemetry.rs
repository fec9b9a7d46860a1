//! JSONL run summaries.
//!
//! Each run appends one JSON object per line, so a file accumulates the
//! history of every run pointed at it.

use anyhow::{Context, Result};
use bude_core::{KernelMetrics, ValidationReport, WorkloadShape};
use bude_gpu::{DeviceKind, PhaseTimings};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::RunConfiguration;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub timestamp: String,
    pub version: String,
    pub device: String,
    pub device_kind: DeviceKind,
    pub iterations: usize,
    pub poses: usize,
    pub wg_size: usize,
    pub deck: PathBuf,
    pub shape: WorkloadShape,
    pub timings: PhaseTimings,
    pub metrics: KernelMetrics,
    pub validation: ValidationReport,
}

impl RunSummary {
    pub fn new(
        config: &RunConfiguration,
        shape: WorkloadShape,
        timings: PhaseTimings,
        metrics: KernelMetrics,
        validation: ValidationReport,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: crate::args::VERSION.to_string(),
            device: config.device.name().to_string(),
            device_kind: config.device.kind(),
            iterations: config.iterations,
            poses: config.poses,
            wg_size: config.wg_size,
            deck: config.deck_dir.clone(),
            shape,
            timings,
            metrics,
            validation,
        }
    }

    /// Appends this summary as one line of `path`, creating the file if needed.
    pub fn append(&self, path: &Path) -> Result<()> {
        let line = serde_json::to_string(self)?;

        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening telemetry file {}", path.display()))?
            .write_all(format!("{}\n", line).as_bytes())?;

        log::info!("Telemetry written to: {}", path.display());
        Ok(())
    }
}
