//! Job orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{JobConfig, SyncJob};
pub use stats::JobStats;
