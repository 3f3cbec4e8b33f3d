//! # bizdesk: Totals From the Command Line
//!
//! Runs the invoicing/POS totals calculator against files on disk.
//!
//! ## Commands
//!
//! - `bizdesk totals <quote.json>` - Compute totals for a quote document
//! - `bizdesk normalize <value>...` - Show how raw rate values are read
//! - `bizdesk config` - Print the effective configuration
//!
//! ## Examples
//!
//! ```bash
//! # Text report, falling back to tax rate 3 for lines without one
//! bizdesk totals quote.json --default-rate 3
//!
//! # JSON for scripts; logs stay on stderr
//! RUST_LOG=warn bizdesk totals quote.json --format json > totals.json
//!
//! # Which catalog values would be clamped?
//! bizdesk normalize 12 0.12 900
//! ```
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Initialize tracing (stderr)
//! 3. Load config: file, then `BIZDESK_*` environment, then validate
//! 4. Run the subcommand and print its output to stdout

use std::error::Error as _;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use bizdesk_core::TaxRateId;
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use commands::totals::OutputFormat;
use config::AppConfig;
use error::AppResult;

/// BizDesk invoice and POS totals
#[derive(Parser)]
#[command(name = "bizdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: platform config dir/bizdesk.toml)
    #[arg(short, long, global = true, env = "BIZDESK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute totals for a quote document
    Totals {
        /// Quote document (JSON)
        file: PathBuf,

        /// Tax rate id used for lines whose rate does not resolve
        #[arg(short, long)]
        default_rate: Option<String>,

        /// Output format (json amounts are in cents)
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the normalized rate for each raw percentage value
    Normalize {
        /// Raw values as stored in the catalog (e.g. 12, 0.12, "12%")
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(output.as_bytes()).and_then(|_| stdout.flush()) {
                error!(error = %e, "Failed to write output");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> AppResult<String> {
    let config = AppConfig::load(cli.config.as_deref())?;
    debug!(?config, "Effective configuration");

    match cli.command {
        Commands::Totals {
            file,
            default_rate,
            format,
        } => {
            let flag = default_rate.map(TaxRateId::new);
            commands::totals::run(&file, config.calculator_config(), flag.as_ref(), format)
        }
        Commands::Normalize { values } => Ok(commands::normalize::run(&values)),
        Commands::Config => commands::config::run(&config),
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bizdesk_core=trace` - Include memo hits and misses
/// - Default: INFO, DEBUG for bizdesk crates
///
/// Output goes to stderr so `--format json` stays clean on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bizdesk=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_totals_args() {
        let cli = Cli::parse_from([
            "bizdesk", "totals", "quote.json", "--default-rate", "3", "--format", "json",
        ]);

        match cli.command {
            Commands::Totals {
                file,
                default_rate,
                format,
            } => {
                assert_eq!(file, PathBuf::from("quote.json"));
                assert_eq!(default_rate.as_deref(), Some("3"));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected totals"),
        }
    }

    #[test]
    fn test_parse_normalize_accepts_negative_values() {
        let cli = Cli::parse_from(["bizdesk", "normalize", "12", "-5"]);
        match cli.command {
            Commands::Normalize { values } => assert_eq!(values, vec!["12", "-5"]),
            _ => panic!("expected normalize"),
        }
    }
}
