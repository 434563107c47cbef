//! Persistent store error types
//!
//! Defines all errors that can occur while reading or writing the key-value store.

use thiserror::Error;

/// Errors that can occur in the persistent store
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored value exists but cannot be interpreted
    #[error("Corrupt value for key {key}: {reason}")]
    Corruption { key: String, reason: String },

    /// The backing storage refused the operation (quota, private mode, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::Corruption {
            key: "ht_theme".to_string(),
            reason: "unknown theme".to_string(),
        };
        assert_eq!(err.to_string(), "Corrupt value for key ht_theme: unknown theme");

        let err = StorageError::Unavailable("quota exceeded".to_string());
        assert_eq!(err.to_string(), "Storage unavailable: quota exceeded");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let storage_err: StorageError = io_err.into();
        assert!(matches!(storage_err, StorageError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let storage_err: StorageError = json_err.into();
        assert!(matches!(storage_err, StorageError::Serialization(_)));
    }
}
