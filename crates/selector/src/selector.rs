//! DesyncSelector - entry point of the desynchronization query

use std::time::Duration;

use chrono::NaiveDateTime;
use contracts::{DatabaseConfig, DesyncCandidate, SyncEventsConfig};
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info, instrument};

use crate::rules::Rule;
use crate::union::{self, Bindings};
use crate::SelectorError;

/// Inputs of one desync query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesyncQuery {
    /// Cutoff for hosts and low-level services (`None` disables rules A and B)
    pub time_limit: Option<NaiveDateTime>,
    /// Cutoff for high-level services (`None` disables rule C)
    pub hls_time_limit: Option<NaiveDateTime>,
    /// Row cap (`None` = unbounded)
    pub max_events: Option<usize>,
}

impl DesyncQuery {
    /// Compute cutoffs from the configured windows
    pub fn from_settings(config: &SyncEventsConfig, now: NaiveDateTime) -> Self {
        Self {
            time_limit: config.time_limit(now),
            hls_time_limit: config.hls_time_limit(now),
            max_events: config.max_events(),
        }
    }

    /// Rules this query runs, in evaluation order
    pub fn enabled_rules(&self) -> Vec<Rule> {
        union::enabled_rules(&self.bindings())
    }

    fn bindings(&self) -> Bindings {
        Bindings {
            time_limit: self.time_limit,
            hls_time_limit: self.hls_time_limit,
            max_events: self.max_events,
        }
    }
}

/// Read-only view of the monitoring database
pub struct DesyncSelector {
    db: Connection,
}

impl DesyncSelector {
    /// Wrap an existing connection
    pub fn new(db: Connection) -> Self {
        Self { db }
    }

    /// Open the configured database file read-only
    #[instrument(name = "selector_open", skip(config), fields(path = %config.path.display()))]
    pub fn open(config: &DatabaseConfig) -> Result<Self, SelectorError> {
        let db = Connection::open_with_flags(
            &config.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SelectorError::open(&config.path, e))?;
        db.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(|e| SelectorError::open(&config.path, e))?;
        debug!("Monitoring database opened");
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &Connection {
        &self.db
    }

    /// Items whose recorded state is stale or inconsistent
    #[instrument(
        name = "selector_get_desync",
        skip(self, query),
        fields(
            time_limit = ?query.time_limit,
            hls_time_limit = ?query.hls_time_limit,
            max_events = ?query.max_events
        )
    )]
    pub fn get_desync(&self, query: &DesyncQuery) -> Result<Vec<DesyncCandidate>, SelectorError> {
        get_desync(&self.db, query)
    }
}

/// Run every enabled rule against `db` and return their set union
pub fn get_desync(
    db: &Connection,
    query: &DesyncQuery,
) -> Result<Vec<DesyncCandidate>, SelectorError> {
    if let Some(limit) = query.time_limit {
        debug!(
            "Listing hosts and services in the database older than {}",
            limit.format("%Y-%m-%d %H:%M:%S")
        );
    }
    if let Some(limit) = query.hls_time_limit {
        debug!(
            "Listing high-level services in the database older than {}",
            limit.format("%Y-%m-%d %H:%M:%S")
        );
    }

    let candidates = union::run(db, &query.enabled_rules(), &query.bindings())?;

    observability::record_candidates_selected(&candidates);
    info!(count = candidates.len(), "Desync query complete");
    Ok(candidates)
}
