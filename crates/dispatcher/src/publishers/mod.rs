//! Publisher implementations
//!
//! Contains LogPublisher and BusPublisher.

mod bus;
mod log;

pub use self::bus::{BusPublisher, BusPublisherConfig};
pub use self::log::LogPublisher;
