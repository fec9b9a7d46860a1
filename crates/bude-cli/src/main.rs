//! BUDE benchmark entry point.
//!
//! Scores a deck of docking poses with the fasten kernel on a selected
//! device, reports throughput and validates the energies.

use anyhow::Result;
use bude_cli::args::{Args, VERSION};
use bude_gpu::{DeviceRegistry, HostFasten};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(args: &Args) -> Result<()> {
    let registry = DeviceRegistry::enumerate()?;

    if args.list {
        bude_cli::report::write_device_listing(&mut std::io::stdout().lock(), &registry)?;
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = bude_cli::run(args, &registry, &HostFasten, Path::new("."), &mut out)?;

    log::info!(
        "Run finished: {:.3} ms average over {} passes, energies in {}",
        outcome.metrics.average_ms,
        outcome.config.iterations,
        outcome.energies_path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    log::info!("bude {} - Starting", VERSION);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", bude_cli::describe_error(&err));
            log::debug!("{:?}", err);
            if bude_cli::is_configuration_fault(&err) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
