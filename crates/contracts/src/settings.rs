//! SyncSettings - Config Loader output
//!
//! Built once at process start and passed by reference to every component.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::{Validate, ValidationError};

/// Complete job configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SyncSettings {
    /// Monitoring database
    #[serde(default)]
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Bus gateway
    #[serde(default)]
    #[validate(nested)]
    pub bus: BusConfig,

    /// Reconciliation tunables
    #[serde(default, rename = "connector-syncevents")]
    #[validate(nested)]
    pub syncevents: SyncEventsConfig,
}

/// Monitoring database location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    #[validate(custom(function = "validate_non_empty_path"))]
    pub path: PathBuf,

    /// How long to wait on a locked database (milliseconds)
    #[serde(default = "default_busy_timeout_ms")]
    #[validate(range(max = 600000))]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("/var/lib/vigilo/vigilo.sqlite")
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Bus gateway connection
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BusConfig {
    /// `host:port` of the gateway
    #[serde(default = "default_bus_addr")]
    #[validate(length(min = 1))]
    pub addr: String,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    #[validate(range(min = 1, max = 3600))]
    pub connect_timeout_secs: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            addr: default_bus_addr(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_bus_addr() -> String {
    "127.0.0.1:5680".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// What the dispatcher does after a failed send
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Log the failure and send the next command
    #[default]
    Continue,
    /// Stop at the first failure
    Abort,
}

/// Reconciliation tunables (`[connector-syncevents]`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncEventsConfig {
    /// Staleness window for hosts and low-level services (negative disables)
    #[serde(default = "default_minutes_old")]
    pub minutes_old: i64,

    /// Staleness window for high-level services (negative disables)
    #[serde(default = "default_minutes_old")]
    pub hls_minutes_old: i64,

    /// Maximum number of candidates per run (0 = unbounded)
    #[serde(default)]
    pub max_events: u64,

    /// Liveness lock file
    #[serde(default = "default_lockfile")]
    #[validate(custom(function = "validate_non_empty_path"))]
    pub lockfile: PathBuf,

    /// Failed send handling
    #[serde(default)]
    pub on_delivery_error: DeliveryPolicy,
}

impl Default for SyncEventsConfig {
    fn default() -> Self {
        Self {
            minutes_old: default_minutes_old(),
            hls_minutes_old: default_minutes_old(),
            max_events: 0,
            lockfile: default_lockfile(),
            on_delivery_error: DeliveryPolicy::default(),
        }
    }
}

fn default_minutes_old() -> i64 {
    35
}

fn default_lockfile() -> PathBuf {
    PathBuf::from("/var/lock/vigilo-connector-syncevents/lock")
}

#[allow(clippy::ptr_arg)]
fn validate_non_empty_path(path: &PathBuf) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::new("empty_path"));
    }
    Ok(())
}

impl SyncEventsConfig {
    /// Cutoff for hosts and low-level services
    pub fn time_limit(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        cutoff(now, self.minutes_old)
    }

    /// Cutoff for high-level services
    pub fn hls_time_limit(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        cutoff(now, self.hls_minutes_old)
    }

    /// Row cap, `None` when unbounded
    pub fn max_events(&self) -> Option<usize> {
        match self.max_events {
            0 => None,
            n => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }
}

fn cutoff(now: NaiveDateTime, minutes: i64) -> Option<NaiveDateTime> {
    if minutes < 0 {
        return None;
    }
    TimeDelta::try_minutes(minutes).and_then(|delta| now.checked_sub_signed(delta))
}
