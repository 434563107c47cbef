//! File-backed key-value store
//!
//! All entries live in one JSON object on disk. Every write rewrites the
//! whole file through a temporary sibling and a rename, so a crash leaves
//! either the old or the new contents, never a torn file.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Name of the store file inside the data directory
pub const STORE_FILE: &str = "store.json";

/// JSON file store; clones share the same file and cache
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<Mutex<FileStoreState>>,
}

#[derive(Debug)]
struct FileStoreState {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store inside `data_dir`, creating the directory if needed
    pub fn open(data_dir: impl AsRef<Path>) -> StorageResult<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;
        Self::open_file(data_dir.join(STORE_FILE))
    }

    /// Open a store backed by an explicit file path
    pub fn open_file(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| StorageError::Corruption {
                    key: path.display().to_string(),
                    reason: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened file store");

        Ok(Self {
            inner: Arc::new(Mutex::new(FileStoreState { path, entries })),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> PathBuf {
        self.inner
            .lock()
            .map(|state| state.path.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, FileStoreState>> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl FileStoreState {
    fn persist(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut state = self.lock()?;
        let mut next = state.entries.clone();
        next.insert(key.to_string(), value.to_string());
        // Only adopt the new map once it is on disk
        state.persist(&next)?;
        state.entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut state = self.lock()?;
        if !state.entries.contains_key(key) {
            return Ok(());
        }
        let mut next = state.entries.clone();
        next.remove(key);
        state.persist(&next)?;
        state.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_persistence_across_opens() {
        let dir = tempdir().unwrap();

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("ht_theme", "dark").unwrap();
            store.set("ht_last_visit", "2024-03-10").unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("ht_theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(
            store.get("ht_last_visit").unwrap().as_deref(),
            Some("2024-03-10")
        );
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("ht_quote", "{}").unwrap();
        store.remove("ht_quote").unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert!(reopened.get("ht_quote").unwrap().is_none());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("ht_accent", "#4CAF50").unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![STORE_FILE.to_string()]);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), "[1, 2").unwrap();

        let err = FileStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, StorageError::Corruption { .. }));
    }

    #[test]
    fn test_empty_file_opens_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), "").unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.get("anything").unwrap().is_none());
    }
}
