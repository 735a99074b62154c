//! # Dispatcher
//!
//! Turns desync candidates into notification commands and hands them to a
//! publisher.
//!
//! Responsibilities:
//! - One command per candidate, in candidate order
//! - Strictly sequential sends (one in flight at a time)
//! - Apply the configured delivery-error policy

pub mod error;
pub mod metrics;
pub mod publishers;
pub mod sender;

pub use contracts::{DesyncCandidate, NagiosCommand, Publisher};
pub use error::DispatcherError;
pub use metrics::{DispatchReport, SendMetrics};
pub use publishers::{BusPublisher, BusPublisherConfig, LogPublisher};
pub use sender::{SenderState, SyncSender};
