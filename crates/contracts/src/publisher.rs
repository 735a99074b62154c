//! Publisher trait - Dispatcher output interface
//!
//! Defines the abstract publish channel. Connection setup happens before a
//! publisher is handed to the dispatcher.

use crate::{ContractError, NagiosCommand};

/// Publish channel trait
///
/// All publisher implementations must implement this trait.
#[trait_variant::make(Publisher: Send)]
pub trait LocalPublisher {
    /// Publisher name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one command
    ///
    /// # Errors
    /// Returns delivery error (should include context)
    async fn write(&mut self, command: &NagiosCommand) -> Result<(), ContractError>;

    /// Tear down the channel
    async fn close(&mut self) -> Result<(), ContractError>;
}
