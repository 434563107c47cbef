//! Habitual Persistent Store
//!
//! A string-keyed, JSON-valued store standing in for the browser's
//! per-origin `localStorage`:
//!
//! - **memory**: In-process store for tests and ephemeral sessions
//! - **file**: Single JSON file on disk, written atomically (native only)
//! - **error**: Error types
//!
//! Values are whole-value overwrites. There is no partial-write state: a
//! `set` either replaces the previous value or fails and leaves it intact.
//!
//! # Example
//!
//! ```rust
//! use habitual::storage::{KeyValueStore, KeyValueStoreExt, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set_json("numbers", &vec![1, 2, 3]).unwrap();
//! let back: Option<Vec<u32>> = store.get_json("numbers").unwrap();
//! assert_eq!(back, Some(vec![1, 2, 3]));
//! ```

pub mod error;
#[cfg(feature = "native")]
pub mod file;
pub mod memory;

pub use error::{StorageError, StorageResult};
#[cfg(feature = "native")]
pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Storage key for the serialized habit list
pub const HABITS_KEY: &str = "ht_habits_v1";
/// Storage key for the theme name
pub const THEME_KEY: &str = "ht_theme";
/// Storage key for the accent color
pub const ACCENT_KEY: &str = "ht_accent";
/// Storage key for the last visit date (`YYYY-MM-DD`)
pub const LAST_VISIT_KEY: &str = "ht_last_visit";
/// Storage key for the cached quote of the day
pub const QUOTE_KEY: &str = "ht_quote";

/// Durable string key-value storage
///
/// Handles are expected to be cheap to clone and to share the same
/// underlying data, the way every `window.localStorage` reference
/// points at the same origin storage.
pub trait KeyValueStore {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// JSON helpers available on every store
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read and deserialize a JSON value
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Corruption {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Serialize and store a JSON value
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
