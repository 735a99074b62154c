//! Layered error definitions
//!
//! Categorized by source: config / bus

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Bus Errors =====
    /// Publisher rejected a command
    #[error("publisher '{publisher}' delivery error: {message}")]
    Delivery { publisher: String, message: String },

    /// Publisher could not reach the bus
    #[error("publisher '{publisher}' connection error: {message}")]
    BusConnection { publisher: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create delivery error
    pub fn delivery(publisher: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery {
            publisher: publisher.into(),
            message: message.into(),
        }
    }

    /// Create bus connection error
    pub fn bus_connection(publisher: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BusConnection {
            publisher: publisher.into(),
            message: message.into(),
        }
    }
}
