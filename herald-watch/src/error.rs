use std::path::PathBuf;

use thiserror::Error;

use herald_core::{NotifyError, StoreError};

/// Error surface for the publish watcher and event handler.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid watch state at {path}: {source}")]
    State {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid publish event: {0}")]
    Event(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),

    #[error("blocking task failed: {0}")]
    Join(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> WatchError {
    WatchError::Io {
        path: path.into(),
        source,
    }
}
