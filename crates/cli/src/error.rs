//! Error types for CLI operations.

use std::path::PathBuf;

use contracts::ContractError;
use dispatcher::DispatcherError;
use selector::SelectorError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Another run holds the lock file
    #[error("Lock file {} is held by another run", path.display())]
    LockUnavailable { path: PathBuf },

    /// Lock file could not be created or written
    #[error("Cannot use lock file {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration or publisher failure
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Desync query failure
    #[error("Desync query failed: {0}")]
    Selector(#[from] SelectorError),

    /// Dispatch failure
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatcherError),
}

impl CliError {
    pub fn lock_unavailable(path: impl Into<PathBuf>) -> Self {
        Self::LockUnavailable { path: path.into() }
    }

    pub fn lock(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Lock {
            path: path.into(),
            source,
        }
    }

    pub fn is_lock_unavailable(&self) -> bool {
        matches!(self, Self::LockUnavailable { .. })
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        if self.is_lock_unavailable() {
            1
        } else {
            2
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
