//! # vigilo-syncevents
//!
//! Command-line entry point.
//!
//! Provides:
//! - Settings loading with CLI overrides
//! - One reconciliation pass under a liveness lock
//! - Exit codes: 0 on success, 1 when another run holds the lock, 2 otherwise

mod cli;
mod commands;
mod error;
mod job;
mod lock;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::{error, info};

use cli::{Cli, Commands};
use commands::{run_info, run_job};
use error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("{e:#}");
        return ExitCode::from(2);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "vigilo-syncevents starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => run_job(args).await,
        Commands::Info(args) => run_info(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format_args!("{e:#}"), "Command failed");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>()
        .map(CliError::exit_code)
        .unwrap_or(2)
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let (debug, metrics_port) = match &cli.command {
        Commands::Run(args) => (args.debug, args.metrics_port),
        Commands::Info(_) => (false, None),
    };

    let level = if cli.quiet {
        "warn"
    } else if debug {
        "debug"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port,
        default_log_level: level.to_string(),
        force_level: cli.quiet || debug,
    })
}
