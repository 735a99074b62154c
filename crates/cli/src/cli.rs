//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// vigilo-syncevents - ask the collectors to re-notify out-of-date items
#[derive(Parser, Debug)]
#[command(
    name = "vigilo-syncevents",
    author,
    version,
    about = "Resynchronise monitoring states with the Nagios collectors",
    long_about = "Finds hosts and services whose recorded state is stale or contradicts \n\
                  their last open event, then asks Nagios to send a fresh notification \n\
                  for each of them over the bus."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "VIGILO_SYNCEVENTS_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "VIGILO_SYNCEVENTS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one reconciliation pass
    Run(RunArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "/etc/vigilo/connector-syncevents/settings.toml",
        env = "VIGILO_SYNCEVENTS_CONFIG"
    )]
    pub config: PathBuf,

    /// Log the commands that would be sent; no lock, no bus
    #[arg(long)]
    pub dry_run: bool,

    /// Debug logging and wire-level tracing of the bus connection
    #[arg(long)]
    pub debug: bool,

    /// Override the monitoring database path
    #[arg(long, env = "VIGILO_SYNCEVENTS_DATABASE")]
    pub database: Option<PathBuf>,

    /// Override the maximum number of items per run (0 = unlimited)
    #[arg(long, env = "VIGILO_SYNCEVENTS_MAX_EVENTS")]
    pub max_events: Option<u64>,

    /// Prometheus exporter port (disabled when unset)
    #[arg(long, env = "VIGILO_SYNCEVENTS_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "/etc/vigilo/connector-syncevents/settings.toml",
        env = "VIGILO_SYNCEVENTS_CONFIG"
    )]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
