//! Asset cache error types

use super::controller::WorkerState;
use thiserror::Error;

/// Errors raised by the asset cache controller and its backends
#[derive(Error, Debug)]
pub enum CacheError {
    /// The request never produced a response
    #[error("Network error for {url}: {reason}")]
    Network { url: String, reason: String },

    /// Cache storage refused the operation
    #[error("Cache storage error: {0}")]
    Storage(String),

    /// I/O operation failed (on-disk cache)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An app-shell asset could not be cached, so the install was abandoned
    #[error("Install failed on {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    /// Lifecycle step not allowed from the current state
    #[error("Cannot {action} while worker is {state}")]
    InvalidState {
        action: &'static str,
        state: WorkerState,
    },

    /// Activation attempted before the current generation was populated
    #[error("Cache generation {0} is not installed")]
    NotInstalled(String),

    /// Scope origin is not an absolute http(s) URL
    #[error("Invalid origin: {0}")]
    InvalidOrigin(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Storage(err.to_string())
    }
}

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
