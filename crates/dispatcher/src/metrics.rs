//! Send metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one dispatch run
#[derive(Debug, Default)]
pub struct SendMetrics {
    /// Successful writes
    sent: AtomicU64,
    /// Failed writes
    failed: AtomicU64,
    /// Candidates never attempted (abort policy)
    skipped: AtomicU64,
}

impl SendMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn inc_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn add_skipped(&self, count: u64) {
        self.skipped.fetch_add(count, Ordering::Relaxed);
    }

    /// Get a report of all counters
    pub fn report(&self) -> DispatchReport {
        DispatchReport {
            sent: self.sent(),
            failed: self.failed(),
            skipped: self.skipped(),
        }
    }
}

/// Outcome of one dispatch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl DispatchReport {
    /// Candidates whose send was attempted
    pub fn attempted(&self) -> u64 {
        self.sent + self.failed
    }

    /// Every attempted send was delivered and none was skipped
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}
