#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Ledger Validator binary.
//!
//! ```text
//! ledger-validator snapshot  <request.json> [--bars <history.json>]
//! ledger-validator pre-trade <context.json>
//! ```
//!
//! Prints the report as JSON on stdout and appends the run to the configured
//! audit trail.
//!
//! # Exit status
//!
//! - `0`: PASS
//! - `1`: FAIL (do not persist / do not execute)
//! - `2`: usage, input, configuration, or audit error
//!
//! # Configuration
//!
//! - `--config` / `LEDGER_VALIDATOR_CONFIG`: YAML config path (default:
//!   `config.yaml`; a missing file means defaults)
//! - `RUST_LOG`: overrides the configured log level

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use ledger_validator::config::{DEFAULT_CONFIG_PATH, load_config_or_default};
use ledger_validator::market_data::attach_missing_ranges;
use ledger_validator::telemetry::init_tracing;
use ledger_validator::{
    DailyBar, IntegrityValidator, JsonlAuditTrail, PreTradeContext, StaticRangeProvider,
    ValidationReport, ValidationRequest,
};

#[derive(Debug, Parser)]
#[command(name = "ledger-validator")]
#[command(about = "Validate a portfolio ledger before it is persisted or traded on")]
struct Cli {
    /// YAML configuration file.
    #[arg(long, env = "LEDGER_VALIDATOR_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Validate a snapshot request (positions, optional trade and equity context).
    Snapshot {
        /// Request JSON file.
        input: PathBuf,

        /// Daily-bar history (JSON object of ticker -> bars) used to derive
        /// ranges for positions the request carries none for.
        #[arg(long)]
        bars: Option<PathBuf>,
    },
    /// Check a proposed trade's preconditions.
    PreTrade {
        /// Pre-trade context JSON file.
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Ledger validation aborted");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config_path = cli.config.display().to_string();
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("loading config from {config_path}"))?;

    init_tracing(&config.observability.logging);

    tracing::info!(
        command = ?cli.command,
        config = %config_path,
        audit_path = %config.audit.path,
        "Starting Ledger Validator"
    );

    let audit = JsonlAuditTrail::open(&config.audit.path)
        .with_context(|| format!("opening audit trail {}", config.audit.path))?;
    let validator = IntegrityValidator::new(&config.tolerances, audit);

    let report = match cli.command {
        Command::Snapshot { input, bars } => {
            let mut request: ValidationRequest = read_json(&input)?;
            if let Some(bars) = bars {
                let history: BTreeMap<String, Vec<DailyBar>> = read_json(&bars)?;
                let provider = StaticRangeProvider::from_bars(&history)
                    .with_context(|| format!("deriving ranges from {}", bars.display()))?;
                request = attach_missing_ranges(&provider, request, &config.market_data).await;
            }
            validator.validate(&request)?
        }
        Command::PreTrade { input } => {
            let context: PreTradeContext = read_json(&input)?;
            validator.check_preconditions(&context)?
        }
    };

    print_report(&report)?;
    Ok(report.passed())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn print_report(report: &ValidationReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("encoding report")?;
    println!("{json}");
    Ok(())
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
    fn test_parse_snapshot() {
        let cli = Cli::try_parse_from(["ledger-validator", "snapshot", "req.json"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Snapshot {
                input: PathBuf::from("req.json"),
                bars: None,
            }
        );
    }

    #[test]
    fn test_parse_snapshot_with_bars_and_config() {
        let cli = Cli::try_parse_from([
            "ledger-validator",
            "--config",
            "prod.yaml",
            "snapshot",
            "req.json",
            "--bars",
            "history.json",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("prod.yaml"));
        assert_eq!(
            cli.command,
            Command::Snapshot {
                input: PathBuf::from("req.json"),
                bars: Some(PathBuf::from("history.json")),
            }
        );
    }

    #[test]
    fn test_parse_pre_trade() {
        let cli = Cli::try_parse_from(["ledger-validator", "pre-trade", "ctx.json"]).unwrap();
        assert_eq!(
            cli.command,
            Command::PreTrade {
                input: PathBuf::from("ctx.json"),
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_command() {
        let err = Cli::try_parse_from(["ledger-validator", "reconcile", "x.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn test_parse_rejects_missing_input() {
        let err = Cli::try_parse_from(["ledger-validator", "snapshot"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
