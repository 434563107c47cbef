//! In-memory key-value store
//!
//! Used by tests and by sessions that should not touch disk.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Shared in-memory store; clones see the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("ht_theme", "dark").unwrap();
        assert_eq!(store.get("ht_theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.len(), 1);

        store.remove("ht_theme").unwrap();
        assert!(store.get("ht_theme").unwrap().is_none());

        // Removing again is fine
        store.remove("ht_theme").unwrap();
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();

        other.set("ht_accent", "#112233").unwrap();
        assert_eq!(store.get("ht_accent").unwrap().as_deref(), Some("#112233"));
    }
}
