//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::SyncSettings;
use tracing::info;

use crate::cli::RunArgs;
use crate::job::{JobConfig, SyncJob};

/// Execute the `run` command
pub async fn run_job(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut settings = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    apply_overrides(&mut settings, args);

    info!(
        database = %settings.database.path.display(),
        bus = %settings.bus.addr,
        minutes_old = settings.syncevents.minutes_old,
        hls_minutes_old = settings.syncevents.hls_minutes_old,
        max_events = settings.syncevents.max_events,
        dry_run = args.dry_run,
        "Configuration loaded"
    );

    let job = SyncJob::new(JobConfig {
        settings,
        dry_run: args.dry_run,
        trace_wire: args.debug,
    });

    // Keep the typed error so main can pick the exit code
    let stats = job.run().await?;

    info!(
        selected = stats.summary.selected(),
        sent = stats.summary.sent,
        failed = stats.summary.failed,
        duration_secs = stats.summary.duration.as_secs_f64(),
        "Run completed"
    );
    if args.dry_run {
        stats.print_summary();
    }

    Ok(())
}

/// Apply CLI overrides on top of the file settings
fn apply_overrides(settings: &mut SyncSettings, args: &RunArgs) {
    if let Some(ref path) = args.database {
        info!(path = %path.display(), "Overriding database path from CLI");
        settings.database.path = path.clone();
    }
    if let Some(max_events) = args.max_events {
        info!(max_events, "Overriding max_events from CLI");
        settings.syncevents.max_events = max_events;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_apply_overrides() {
        let mut settings = SyncSettings::default();
        let args = RunArgs {
            config: PathBuf::from("settings.toml"),
            dry_run: false,
            debug: false,
            database: Some(PathBuf::from("/tmp/other.sqlite")),
            max_events: Some(7),
            metrics_port: None,
        };

        apply_overrides(&mut settings, &args);
        assert_eq!(settings.database.path, PathBuf::from("/tmp/other.sqlite"));
        assert_eq!(settings.syncevents.max_events, 7);
        assert_eq!(settings.syncevents.minutes_old, 35);
    }
}
