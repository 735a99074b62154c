//! LogPublisher - logs commands via tracing instead of sending them

use contracts::{ContractError, NagiosCommand, Publisher};
use tracing::{info, instrument};

/// Publisher that only logs what would be sent
pub struct LogPublisher {
    name: String,
    written: u64,
}

impl LogPublisher {
    /// Create a new LogPublisher with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            written: 0,
        }
    }

    /// Commands logged so far
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl Publisher for LogPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_publisher_write",
        skip(self, command),
        fields(publisher = %self.name, cmdname = %command.cmdname)
    )]
    async fn write(&mut self, command: &NagiosCommand) -> Result<(), ContractError> {
        self.written += 1;
        info!(
            publisher = %self.name,
            value = %command.value,
            routing_key = command.routing_key.as_deref().unwrap_or("-"),
            timestamp = command.timestamp,
            "Would send command"
        );
        Ok(())
    }

    #[instrument(name = "log_publisher_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(publisher = %self.name, written = self.written, "LogPublisher closed");
        Ok(())
    }
}
