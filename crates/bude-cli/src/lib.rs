//! # bude-cli
//!
//! Drives one benchmark run: resolve configuration, load the deck, dispatch
//! through `bude-gpu`, then report metrics and validate the energies.

pub mod args;
pub mod config;
pub mod report;
pub mod telemetry;

use anyhow::{Context, Result};
use bude_core::{BudeError, Deck, KernelMetrics, ReferenceEnergies, ValidationReport};
use bude_gpu::{run_benchmark, BenchmarkRun, DeviceRegistry, DispatchPlan, FastenKernel};
use std::io::Write;
use std::path::{Path, PathBuf};

pub use args::Args;
pub use config::{BenchConfig, RunConfiguration};
pub use telemetry::RunSummary;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub config: RunConfiguration,
    pub run: BenchmarkRun,
    pub metrics: KernelMetrics,
    pub validation: ValidationReport,
    pub energies_path: PathBuf,
}

/// Runs the benchmark described by `args` with `kernel`.
///
/// Human-readable output goes to `out`; `energies.out` is written into
/// `out_dir` once the reference energies are known to cover the run.
pub fn run(
    args: &Args,
    registry: &DeviceRegistry,
    kernel: &dyn FastenKernel,
    out_dir: &Path,
    out: &mut impl Write,
) -> Result<RunOutcome> {
    let bench = BenchConfig::load(args)?;
    let (config, _) = RunConfiguration::resolve(&bench, registry)?;

    report::write_device_listing(out, registry)?;

    let deck = Deck::load(&config.deck_dir, config.poses)
        .with_context(|| format!("loading deck from {}", config.deck_dir.display()))?;
    report::write_parameters(out, &config, &deck.shape())?;

    let plan = DispatchPlan {
        iterations: config.iterations,
        wg_size: config.wg_size,
    };
    let run = run_benchmark(&config.device, &deck, kernel, plan)
        .with_context(|| format!("running {} on {}", kernel.name(), config.device.name()))?;

    let metrics = KernelMetrics::compute(run.timings.kernel_ms, config.iterations, &run.shape);
    report::write_timings(out, &run.timings, &metrics)?;

    report::write_validation_limit(out, config.poses)?;
    let references = ReferenceEnergies::read(
        &deck.reference_path(),
        ReferenceEnergies::required_count(config.poses),
    )?;

    let energies_path = out_dir.join(report::ENERGIES_FILE);
    report::write_energies(&energies_path, &run.energies)?;
    report::write_energy_preview(out, &run.energies)?;

    let validation = references.compare(&run.energies);
    report::write_validation(out, &validation)?;
    log::info!(
        "Validated {} energies ({} near zero skipped)",
        validation.compared,
        validation.skipped
    );

    if let Some(path) = &bench.telemetry_path {
        RunSummary::new(&config, run.shape, run.timings, metrics, validation).append(path)?;
    }

    Ok(RunOutcome {
        config,
        run,
        metrics,
        validation,
        energies_path,
    })
}

/// Renders a failed run for the terminal.
///
/// Context added along the way is listed outermost first. The chain stops at
/// the first [`BudeError`], which is shown with its guidance.
pub fn describe_error(err: &anyhow::Error) -> String {
    let mut lines = Vec::new();
    for cause in err.chain() {
        if let Some(bude) = cause.downcast_ref::<BudeError>() {
            lines.push(bude.user_message());
            break;
        }
        lines.push(cause.to_string());
    }
    lines.join("\n  caused by: ")
}

/// True when the run never got past its inputs: bad configuration or no usable device.
pub fn is_configuration_fault(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<BudeError>())
        .any(BudeError::is_configuration_fault)
}
