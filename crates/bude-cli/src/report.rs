//! Human-readable run output on stdout and the `energies.out` file.

use bude_core::types::REF_POSES;
use bude_core::{BudeError, KernelMetrics, ValidationReport, WorkloadShape};
use bude_gpu::{DeviceRegistry, PhaseTimings};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::RunConfiguration;

/// Energies echoed to stdout after a run.
pub const PREVIEW_ENERGIES: usize = 16;

/// File the per-pose energies are written to.
pub const ENERGIES_FILE: &str = "energies.out";

pub fn write_device_listing(out: &mut impl Write, registry: &DeviceRegistry) -> io::Result<()> {
    writeln!(out, "Available devices:")?;
    write!(out, "{}", registry.listing())
}

/// Device details followed by the run parameters.
pub fn write_parameters(
    out: &mut impl Write,
    config: &RunConfiguration,
    shape: &WorkloadShape,
) -> io::Result<()> {
    let info = config.device.info();
    writeln!(out, "Device    : {}", info.name)?;
    writeln!(out, "\tType    : {}", info.kind)?;
    writeln!(out, "\tProfile : {}", info.profile)?;
    writeln!(out, "\tVersion : {}", info.version)?;
    writeln!(out, "\tVendor  : {}", info.vendor)?;
    writeln!(out, "\tDriver  : {}", info.driver_version)?;
    writeln!(out, "Poses     : {}", config.poses)?;
    writeln!(out, "Iterations: {}", config.iterations)?;
    writeln!(out, "Ligands   : {}", shape.natlig)?;
    writeln!(out, "Proteins  : {}", shape.natpro)?;
    writeln!(out, "Deck      : {}", config.deck_dir.display())?;
    writeln!(
        out,
        "WG        : {} (grouped: {})",
        config.wg_size,
        config.grouped()
    )
}

pub fn write_timings(
    out: &mut impl Write,
    timings: &PhaseTimings,
    metrics: &KernelMetrics,
) -> io::Result<()> {
    writeln!(out, "Context time:    {:.3} ms", timings.context_ms)?;
    writeln!(out, "Xfer+Alloc time: {:.3} ms", timings.xfer_alloc_ms)?;
    writeln!(out, "Warmup time:     {:.3} ms", timings.warmup_ms)?;
    writeln!(out)?;
    writeln!(out, "- Kernel time:    {:.3} ms", metrics.total_ms)?;
    writeln!(out, "- Average time:   {:.3} ms", metrics.average_ms)?;
    writeln!(
        out,
        "- Interactions/s: {:.3} billion",
        metrics.giga_interactions()
    )?;
    writeln!(out, "- GFLOP/s:        {:.3}", metrics.gflops())?;
    writeln!(out, "- GFInst/s:       {:.3}", metrics.gfinsts())
}

/// One `{:7.2}` energy per line.
pub fn format_energy(energy: f32) -> String {
    format!("{:7.2}", energy)
}

/// Writes every energy to `path`, replacing any existing file.
pub fn write_energies(path: &Path, energies: &[f32]) -> bude_core::Result<()> {
    let io_err = |source: io::Error| BudeError::io(path, source);
    let mut file = BufWriter::new(File::create(path).map_err(io_err)?);
    for &energy in energies {
        writeln!(file, "{}", format_energy(energy)).map_err(io_err)?;
    }
    file.flush().map_err(io_err)
}

pub fn write_energy_preview(out: &mut impl Write, energies: &[f32]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Energies")?;
    for &energy in energies.iter().take(PREVIEW_ENERGIES) {
        writeln!(out, "{}", format_energy(energy))?;
    }
    Ok(())
}

/// Notice printed when only a prefix of the poses has reference energies.
pub fn write_validation_limit(out: &mut impl Write, poses: usize) -> io::Result<()> {
    if poses > REF_POSES {
        writeln!(out, "Only validating the first {} poses.", REF_POSES)?;
    }
    Ok(())
}

pub fn write_validation(out: &mut impl Write, report: &ValidationReport) -> io::Result<()> {
    writeln!(
        out,
        "Largest difference was {:.3}%.",
        report.max_difference_percent()
    )?;
    writeln!(out)
}
