//! Job statistics.

use dispatcher::DispatchReport;
use observability::RunSummary;

/// Statistics from one job run
#[derive(Debug, Clone, Default)]
pub struct JobStats {
    /// Counts by candidate kind and send outcome
    pub summary: RunSummary,

    /// Commands were only logged
    pub dry_run: bool,

    /// Whether the publish channel was contacted
    pub connected: bool,
}

impl JobStats {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn record_report(&mut self, report: &DispatchReport) {
        self.summary
            .record_dispatch(report.sent, report.failed, report.skipped);
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!();
        if self.dry_run {
            println!("(dry run: nothing was sent)");
        }
        println!("{}", self.summary);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_report() {
        let mut stats = JobStats::new(false);
        stats.record_report(&DispatchReport {
            sent: 4,
            failed: 1,
            skipped: 2,
        });
        assert_eq!(stats.summary.sent, 4);
        assert_eq!(stats.summary.failed, 1);
        assert_eq!(stats.summary.skipped, 2);
        assert!(!stats.connected);
    }
}
