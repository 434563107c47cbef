//! Cache storage seam
//!
//! A set of named generations, each mapping absolute URLs to responses.

use super::error::{CacheError, CacheResult};
use super::types::Response;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Named cache generations, modelled on the browser Cache Storage API
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait CacheStorage {
    /// Names of every stored generation
    async fn generations(&self) -> CacheResult<Vec<String>>;

    /// Response stored for `url` in `generation`
    async fn lookup(&self, generation: &str, url: &str) -> CacheResult<Option<Response>>;

    /// Store one response, creating the generation if needed
    async fn put(&self, generation: &str, url: &str, response: &Response) -> CacheResult<()>;

    /// Store a batch of responses as a unit
    ///
    /// Either every entry becomes visible or, on error, none does.
    async fn commit(&self, generation: &str, entries: Vec<(String, Response)>) -> CacheResult<()>;

    /// Drop a generation; returns whether it existed
    async fn delete(&self, generation: &str) -> CacheResult<bool>;

    /// URLs stored in `generation`
    async fn entries(&self, generation: &str) -> CacheResult<Vec<String>>;
}

type Generations = BTreeMap<String, BTreeMap<String, Response>>;

/// In-process cache storage
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStorage {
    generations: Arc<Mutex<Generations>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut Generations) -> T) -> CacheResult<T> {
        let mut guard = self
            .generations
            .lock()
            .map_err(|e| CacheError::Storage(format!("lock poisoned: {}", e)))?;
        Ok(f(&mut guard))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl CacheStorage for MemoryCacheStorage {
    async fn generations(&self) -> CacheResult<Vec<String>> {
        self.with(|g| g.keys().cloned().collect())
    }

    async fn lookup(&self, generation: &str, url: &str) -> CacheResult<Option<Response>> {
        self.with(|g| g.get(generation).and_then(|entries| entries.get(url).cloned()))
    }

    async fn put(&self, generation: &str, url: &str, response: &Response) -> CacheResult<()> {
        self.with(|g| {
            g.entry(generation.to_string())
                .or_default()
                .insert(url.to_string(), response.clone());
        })
    }

    async fn commit(&self, generation: &str, entries: Vec<(String, Response)>) -> CacheResult<()> {
        self.with(|g| {
            g.entry(generation.to_string()).or_default().extend(entries);
        })
    }

    async fn delete(&self, generation: &str) -> CacheResult<bool> {
        self.with(|g| g.remove(generation).is_some())
    }

    async fn entries(&self, generation: &str) -> CacheResult<Vec<String>> {
        self.with(|g| {
            g.get(generation)
                .map(|entries| entries.keys().cloned().collect())
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_lookup_delete() {
        let storage = MemoryCacheStorage::new();
        let url = "https://habits.example/index.html";

        assert!(storage.lookup("v1", url).await.unwrap().is_none());

        storage.put("v1", url, &Response::new(200, "shell")).await.unwrap();
        let hit = storage.lookup("v1", url).await.unwrap().unwrap();
        assert_eq!(hit.body, b"shell");
        assert!(storage.lookup("v2", url).await.unwrap().is_none());

        assert_eq!(storage.generations().await.unwrap(), vec!["v1".to_string()]);
        assert!(storage.delete("v1").await.unwrap());
        assert!(!storage.delete("v1").await.unwrap());
        assert!(storage.generations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_merges_into_generation() {
        let storage = MemoryCacheStorage::new();
        storage
            .put("v1", "https://a.test/x", &Response::new(200, "x"))
            .await
            .unwrap();

        storage
            .commit(
                "v1",
                vec![
                    ("https://a.test/y".to_string(), Response::new(200, "y")),
                    ("https://a.test/z".to_string(), Response::new(200, "z")),
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            storage.entries("v1").await.unwrap(),
            vec!["https://a.test/x", "https://a.test/y", "https://a.test/z"]
        );
    }
}
