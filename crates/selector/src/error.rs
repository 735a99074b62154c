//! Selector error types

use std::path::PathBuf;

use thiserror::Error;

/// Selector-specific errors
#[derive(Debug, Error)]
pub enum SelectorError {
    /// Database could not be opened
    #[error("cannot open database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("data store error: {0}")]
    DataStore(#[from] rusqlite::Error),
}

impl SelectorError {
    /// Create an open error
    pub fn open(path: impl Into<PathBuf>, source: rusqlite::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }
}
