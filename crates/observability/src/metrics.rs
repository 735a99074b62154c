//! Job metrics
//!
//! Counters and gauges are exported through the `metrics` facade; they are
//! no-ops unless a recorder (e.g. Prometheus) is installed.

use contracts::{CandidateKind, DesyncCandidate};
use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record the outcome of one desync query
pub fn record_candidates_selected(candidates: &[DesyncCandidate]) {
    gauge!("vigilo_syncevents_last_run_candidates").set(candidates.len() as f64);

    for candidate in candidates {
        counter!(
            "vigilo_syncevents_candidates_selected_total",
            "kind" => candidate.kind().as_str()
        )
        .increment(1);
    }
}

/// Record one send attempt
pub fn record_command_sent(publisher: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "vigilo_syncevents_commands_sent_total",
        "publisher" => publisher.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record the wall time of a complete run
pub fn record_run_duration_ms(duration_ms: f64) {
    histogram!("vigilo_syncevents_run_duration_ms").record(duration_ms);
}

/// Per-run counts, aggregated in memory for the final log line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub hosts: u64,
    pub low_level_services: u64,
    pub high_level_services: u64,
    pub sent: u64,
    pub failed: u64,
    pub skipped: u64,
    pub duration: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count selected candidates by kind
    pub fn record_candidates(&mut self, candidates: &[DesyncCandidate]) {
        for candidate in candidates {
            match candidate.kind() {
                CandidateKind::Host => self.hosts += 1,
                CandidateKind::LowLevelService => self.low_level_services += 1,
                CandidateKind::HighLevelService => self.high_level_services += 1,
            }
        }
    }

    /// Add the dispatch outcome
    pub fn record_dispatch(&mut self, sent: u64, failed: u64, skipped: u64) {
        self.sent += sent;
        self.failed += failed;
        self.skipped += skipped;
    }

    pub fn finish(&mut self, duration: Duration) {
        self.duration = duration;
        record_run_duration_ms(duration.as_secs_f64() * 1000.0);
    }

    pub fn selected(&self) -> u64 {
        self.hosts + self.low_level_services + self.high_level_services
    }

    /// Share of attempted sends that failed, in percent
    pub fn failure_rate(&self) -> f64 {
        let attempted = self.sent + self.failed;
        if attempted == 0 {
            0.0
        } else {
            self.failed as f64 / attempted as f64 * 100.0
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Syncevents Run Summary ===")?;
        writeln!(
            f,
            "Selected: {} (hosts={}, services={}, high-level services={})",
            self.selected(),
            self.hosts,
            self.low_level_services,
            self.high_level_services
        )?;
        writeln!(
            f,
            "Sent: {}  Failed: {} ({:.2}%)  Skipped: {}",
            self.sent,
            self.failed,
            self.failure_rate(),
            self.skipped
        )?;
        write!(f, "Duration: {:.3}s", self.duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_by_kind() {
        let mut summary = RunSummary::new();
        summary.record_candidates(&[
            DesyncCandidate::host("h1", None),
            DesyncCandidate::host("h2", Some("collector".into())),
            DesyncCandidate::low_level_service("h1", "load", None),
            DesyncCandidate::high_level_service("portal"),
        ]);

        assert_eq!(summary.hosts, 2);
        assert_eq!(summary.low_level_services, 1);
        assert_eq!(summary.high_level_services, 1);
        assert_eq!(summary.selected(), 4);
    }

    #[test]
    fn test_failure_rate() {
        let mut summary = RunSummary::new();
        assert_eq!(summary.failure_rate(), 0.0);

        summary.record_dispatch(3, 1, 0);
        assert!((summary.failure_rate() - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let mut summary = RunSummary::new();
        summary.record_candidates(&[DesyncCandidate::host("h", None)]);
        summary.record_dispatch(1, 0, 0);

        let output = summary.to_string();
        assert!(output.contains("Selected: 1 (hosts=1"));
        assert!(output.contains("Sent: 1  Failed: 0 (0.00%)"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_candidates_selected(&[DesyncCandidate::high_level_service("portal")]);
        record_command_sent("bus", false);
    }
}
