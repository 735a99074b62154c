//! `info` command implementation.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use contracts::SyncSettings;
use selector::DesyncQuery;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    config_path: String,
    settings: SyncSettings,
    limits: LimitsInfo,
}

#[derive(Serialize)]
struct LimitsInfo {
    now: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_limit: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hls_time_limit: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_events: Option<usize>,
    rules: Vec<&'static str>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let settings = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let info = build_config_info(settings, args, Utc::now().naive_utc());

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(settings: SyncSettings, args: &InfoArgs, now: NaiveDateTime) -> ConfigInfo {
    let query = DesyncQuery::from_settings(&settings.syncevents, now);
    let limits = LimitsInfo {
        now,
        time_limit: query.time_limit,
        hls_time_limit: query.hls_time_limit,
        max_events: query.max_events,
        rules: query.enabled_rules().iter().map(|r| r.name()).collect(),
    };

    ConfigInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config_path: args.config.display().to_string(),
        settings,
        limits,
    }
}

fn fmt_limit(limit: Option<NaiveDateTime>) -> String {
    limit
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "disabled".to_string())
}

fn print_config_info(info: &ConfigInfo) {
    let settings = &info.settings;
    let sync = &settings.syncevents;

    println!("vigilo-syncevents {}", info.version);
    println!("Configuration: {}\n", info.config_path);

    println!("Database");
    println!("   ├─ Path: {}", settings.database.path.display());
    println!("   └─ Busy timeout: {} ms", settings.database.busy_timeout_ms);

    println!("\nBus");
    println!("   ├─ Address: {}", settings.bus.addr);
    println!("   └─ Connect timeout: {} s", settings.bus.connect_timeout_secs);

    println!("\nSyncevents");
    println!("   ├─ minutes_old: {}", sync.minutes_old);
    println!("   ├─ hls_minutes_old: {}", sync.hls_minutes_old);
    match info.limits.max_events {
        Some(n) => println!("   ├─ max_events: {}", n),
        None => println!("   ├─ max_events: unlimited"),
    }
    println!("   ├─ lockfile: {}", sync.lockfile.display());
    println!("   └─ on_delivery_error: {:?}", sync.on_delivery_error);

    println!("\nLimits (UTC)");
    println!("   ├─ Hosts and services older than: {}", fmt_limit(info.limits.time_limit));
    println!(
        "   ├─ High-level services older than: {}",
        fmt_limit(info.limits.hls_time_limit)
    );
    println!("   └─ Rules: {}", info.limits.rules.join(", "));

    println!();
}
