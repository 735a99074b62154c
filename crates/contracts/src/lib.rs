//! # Contracts
//!
//! Shared interface contracts between the selector, the dispatcher and the CLI.
//! Business crates only depend on this crate, never on each other's internals.
//!
//! ## Time Model
//! - Monitoring timestamps are UTC `NaiveDateTime` values
//! - Command timestamps are whole seconds since the Unix epoch

mod candidate;
mod command;
mod error;
mod publisher;
mod settings;
mod state;

pub use candidate::*;
pub use command::*;
pub use error::*;
pub use publisher::Publisher;
pub use settings::*;
pub use state::*;
