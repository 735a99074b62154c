//! Command implementations.

mod info;
mod run;

pub use info::run_info;
pub use run::run_job;
