//! Command-line arguments.
//!
//! Every run option is optional here so that values from a `--config` file
//! survive unless the flag is given explicitly.

use clap::Parser;
use std::path::PathBuf;

/// bude version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bude")]
#[command(version = VERSION)]
#[command(about = "BUDE fasten kernel benchmark on shared-memory devices", long_about = None)]
pub struct Args {
    /// Repeat the kernel N times (default: 8)
    #[arg(short = 'i', long, value_name = "N")]
    pub iterations: Option<usize>,

    /// Compute energies for N poses (default: 65536)
    #[arg(short = 'n', long, value_name = "N")]
    pub numposes: Option<usize>,

    /// Work-group size; 0 runs a plain ungrouped range (default: 4)
    #[arg(short = 'w', long, value_name = "WGSIZE")]
    pub wgsize: Option<usize>,

    /// Device to run on, by index or by a substring of its name
    ///
    /// Example: --device 1, --device "serial"
    #[arg(short = 'd', long, value_name = "INDEX|NAME")]
    pub device: Option<String>,

    /// Directory holding the input deck (default: ../data/bm1)
    #[arg(long, value_name = "DIR")]
    pub deck: Option<PathBuf>,

    /// List available devices and exit
    #[arg(short = 'l', long)]
    pub list: bool,

    /// TOML file with run defaults; flags given here take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Append a JSON run summary to this file
    #[arg(long, value_name = "FILE")]
    pub telemetry: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("bude").chain(argv.iter().copied()))
    }

    #[test]
    fn test_short_and_long_flags() {
        let args = parse(&["-i", "3", "--numposes", "128", "-w", "0", "-d", "serial"]).unwrap();
        assert_eq!(args.iterations, Some(3));
        assert_eq!(args.numposes, Some(128));
        assert_eq!(args.wgsize, Some(0));
        assert_eq!(args.device.as_deref(), Some("serial"));
        assert!(!args.list);
    }

    #[test]
    fn test_defaults_are_unset() {
        let args = parse(&[]).unwrap();
        assert!(args.iterations.is_none());
        assert!(args.deck.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_malformed_and_negative_numbers_are_rejected() {
        assert_eq!(parse(&["-i", "abc"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert!(parse(&["--numposes", "-5"]).is_err());
        assert!(parse(&["-w", "1.5"]).is_err());
    }

    #[test]
    fn test_missing_value_and_unknown_flag() {
        assert!(parse(&["--iterations"]).is_err());
        assert_eq!(
            parse(&["--frobnicate"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
    }

    #[test]
    fn test_help_and_version_are_not_failures() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse(&["-V"]).unwrap_err().kind(), ErrorKind::DisplayVersion);
    }
}
