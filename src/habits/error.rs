//! Habit layer error types

use crate::storage::StorageError;
use thiserror::Error;

/// Reasons an import document is rejected
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Not JSON at all
    #[error("Invalid file: {0}")]
    Malformed(String),

    /// JSON, but without a usable `habits` array
    #[error("Invalid file: {0}")]
    InvalidFormat(String),

    /// A habit record failed validation
    #[error("Invalid habit #{index}: {reason}")]
    InvalidHabit { index: usize, reason: String },

    /// Two records share an id
    #[error("Duplicate habit id: {0}")]
    DuplicateId(String),
}

/// Errors surfaced by the habit repository
#[derive(Error, Debug)]
pub enum HabitError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Import failed: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl From<serde_json::Error> for HabitError {
    fn from(err: serde_json::Error) -> Self {
        HabitError::Storage(StorageError::from(err))
    }
}

/// Result type alias for habit operations
pub type HabitResult<T> = Result<T, HabitError>;
