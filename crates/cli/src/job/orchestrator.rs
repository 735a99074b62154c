//! Job orchestrator - lock, select, dispatch.

use std::time::Instant;

use chrono::Utc;
use contracts::{DesyncCandidate, Publisher, SyncSettings};
use dispatcher::{
    BusPublisher, BusPublisherConfig, DispatchReport, DispatcherError, LogPublisher, SyncSender,
};
use selector::{DesyncQuery, DesyncSelector};
use tracing::{debug, info, instrument, warn};

use super::JobStats;
use crate::error::Result;
use crate::lock::LockGuard;

/// Job configuration
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Effective settings, CLI overrides applied
    pub settings: SyncSettings,

    /// Log commands instead of sending them
    pub dry_run: bool,

    /// Trace every payload written to the bus
    pub trace_wire: bool,
}

/// One reconciliation pass
pub struct SyncJob {
    config: JobConfig,
}

impl SyncJob {
    pub fn new(config: JobConfig) -> Self {
        Self { config }
    }

    /// Run the job to completion
    ///
    /// The lock is held until this returns. Nothing is contacted when no
    /// candidate is found.
    #[instrument(name = "sync_job_run", skip(self), fields(dry_run = self.config.dry_run))]
    pub async fn run(self) -> Result<JobStats> {
        let start_time = Instant::now();
        let settings = &self.config.settings;

        let lock = if self.config.dry_run {
            None
        } else {
            Some(LockGuard::acquire(&settings.syncevents.lockfile)?)
        };
        if let Some(ref guard) = lock {
            debug!(path = %guard.path().display(), "Holding liveness lock");
        }

        let selector = DesyncSelector::open(&settings.database)?;
        let query = DesyncQuery::from_settings(&settings.syncevents, Utc::now().naive_utc());
        let candidates = selector.get_desync(&query)?;
        drop(selector);

        let mut stats = JobStats::new(self.config.dry_run);
        stats.summary.record_candidates(&candidates);

        if candidates.is_empty() {
            info!("No desynchronized item found, nothing to do");
            stats.summary.finish(start_time.elapsed());
            return Ok(stats);
        }

        info!(
            count = candidates.len(),
            "Found {} desynchronized items",
            candidates.len()
        );

        let policy = settings.syncevents.on_delivery_error;
        let result = if self.config.dry_run {
            dispatch(LogPublisher::new("dry-run"), &candidates, policy).await
        } else {
            let publisher = BusPublisher::connect(
                "bus",
                BusPublisherConfig::from_settings(&settings.bus, self.config.trace_wire),
            )
            .await?;
            stats.connected = true;
            dispatch(publisher, &candidates, policy).await
        };

        match result {
            Ok(report) => {
                if !report.is_clean() {
                    warn!(
                        attempted = report.attempted(),
                        failed = report.failed,
                        "Some commands were not delivered"
                    );
                }
                stats.record_report(&report);
                stats.summary.finish(start_time.elapsed());
                Ok(stats)
            }
            Err(e) => {
                if let Some(report) = e.report() {
                    stats.record_report(report);
                }
                stats.summary.finish(start_time.elapsed());
                warn!(
                    sent = stats.summary.sent,
                    failed = stats.summary.failed,
                    skipped = stats.summary.skipped,
                    "Run ended early"
                );
                Err(e.into())
            }
        }
    }
}

/// Send every candidate, then close the publisher whatever the outcome
async fn dispatch<P: Publisher>(
    publisher: P,
    candidates: &[DesyncCandidate],
    policy: contracts::DeliveryPolicy,
) -> std::result::Result<DispatchReport, DispatcherError> {
    let mut sender = SyncSender::new(publisher, policy);
    let result = sender.ask_nagios(candidates).await;
    if let Err(e) = sender.close().await {
        warn!(error = %e, "Failed to close publisher");
    }
    result
}
