//! Dispatcher error types

use thiserror::Error;

use crate::metrics::DispatchReport;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// A send failed under the `abort` policy
    #[error("dispatch aborted after {} sent, {} skipped: {source}", report.sent, report.skipped)]
    Aborted {
        report: DispatchReport,
        #[source]
        source: contracts::ContractError,
    },

    /// Publisher error (from contract)
    #[error("publisher error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create an abort error
    pub fn aborted(report: DispatchReport, source: contracts::ContractError) -> Self {
        Self::Aborted { report, source }
    }

    /// Report attached to the error, if any
    pub fn report(&self) -> Option<&DispatchReport> {
        match self {
            Self::Aborted { report, .. } => Some(report),
            _ => None,
        }
    }
}
