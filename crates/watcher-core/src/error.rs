//! Unified error handling for the poll → emit pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for watcher components.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// Failure talking to the external source; the cycle is skipped and
    /// retried on the next interval.
    #[error("source unavailable: {0}")]
    Source(#[from] anyhow::Error),

    /// Filesystem failure while emitting an action file; the item is not
    /// marked seen and retries on the next cycle.
    #[error("failed to write {path}: {source}")]
    ItemWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Seen-set store failure; emission already succeeded, logged only.
    #[error("seen-set store {path}: {source}")]
    State {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unrecoverable startup failure (bad credentials, vault path).
    #[error("initialization failed: {0}")]
    Init(String),
}

impl WatcherError {
    /// Create an initialization error
    pub fn init(message: impl Into<String>) -> Self {
        WatcherError::Init(message.into())
    }
}
