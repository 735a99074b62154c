//! SyncSender - sequential delivery of notification commands

use std::sync::Arc;

use chrono::Utc;
use contracts::{DeliveryPolicy, DesyncCandidate, NagiosCommand, Publisher};
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatcherError;
use crate::metrics::{DispatchReport, SendMetrics};

/// Lifecycle of a sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderState {
    /// Nothing sent yet
    Idle,
    /// One send in flight
    Sending,
    /// Every candidate attempted (or the run was aborted)
    Done,
}

/// Sends one command per candidate through a publisher, one at a time
pub struct SyncSender<P> {
    publisher: P,
    policy: DeliveryPolicy,
    state: SenderState,
    metrics: Arc<SendMetrics>,
}

impl<P: Publisher> SyncSender<P> {
    pub fn new(publisher: P, policy: DeliveryPolicy) -> Self {
        Self {
            publisher,
            policy,
            state: SenderState::Idle,
            metrics: Arc::new(SendMetrics::new()),
        }
    }

    pub fn state(&self) -> SenderState {
        self.state
    }

    pub fn metrics(&self) -> &Arc<SendMetrics> {
        &self.metrics
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn into_publisher(self) -> P {
        self.publisher
    }

    /// Build the command for `candidate`, stamped with the current time
    pub fn build_command(candidate: &DesyncCandidate) -> NagiosCommand {
        let timestamp = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        NagiosCommand::for_candidate(candidate, timestamp)
    }

    /// Ask the monitoring daemon to re-notify every candidate
    ///
    /// Sends are awaited one after the other in candidate order. Under
    /// [`DeliveryPolicy::Abort`] the first failure ends the run and the
    /// remaining candidates are reported as skipped.
    #[instrument(
        name = "sync_sender_ask_nagios",
        skip(self, candidates),
        fields(
            publisher = %self.publisher.name(),
            candidates = candidates.len(),
            policy = ?self.policy
        )
    )]
    pub async fn ask_nagios(
        &mut self,
        candidates: &[DesyncCandidate],
    ) -> Result<DispatchReport, DispatcherError> {
        let before = self.metrics.report();
        self.state = SenderState::Sending;

        for (index, candidate) in candidates.iter().enumerate() {
            debug!(kind = candidate.kind().as_str(), "Asking update for {candidate}");
            let command = Self::build_command(candidate);

            match self.publisher.write(&command).await {
                Ok(()) => {
                    self.metrics.inc_sent();
                    observability::record_command_sent(self.publisher.name(), true);
                }
                Err(e) => {
                    self.metrics.inc_failed();
                    observability::record_command_sent(self.publisher.name(), false);
                    error!(
                        publisher = %self.publisher.name(),
                        value = %command.value,
                        error = %e,
                        "Send failed"
                    );

                    if self.policy == DeliveryPolicy::Abort {
                        let remaining = (candidates.len() - index - 1) as u64;
                        self.metrics.add_skipped(remaining);
                        self.state = SenderState::Done;
                        let report = self.run_report(before);
                        warn!(skipped = remaining, "Aborting dispatch after delivery failure");
                        return Err(DispatcherError::aborted(report, e));
                    }
                }
            }
        }

        self.state = SenderState::Done;
        let report = self.run_report(before);
        info!(
            sent = report.sent,
            failed = report.failed,
            "Dispatch complete"
        );
        Ok(report)
    }

    /// Counts for the current run only
    fn run_report(&self, before: DispatchReport) -> DispatchReport {
        let now = self.metrics.report();
        DispatchReport {
            sent: now.sent - before.sent,
            failed: now.failed - before.failed,
            skipped: now.skipped - before.skipped,
        }
    }

    /// Close the underlying publisher
    pub async fn close(&mut self) -> Result<(), DispatcherError> {
        self.publisher.close().await?;
        Ok(())
    }
}
