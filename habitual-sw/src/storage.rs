//! Cache Storage API adapter

use async_trait::async_trait;
use habitual::cache::{CacheError, CacheResult, CacheStorage};
use habitual::Response;
use js_sys::{Array, Promise};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Cache;

use crate::convert::{from_web_response, to_web_response};

/// [`CacheStorage`] over the worker's `caches` object
#[derive(Clone)]
pub struct BrowserCacheStorage {
    caches: web_sys::CacheStorage,
}

impl BrowserCacheStorage {
    pub fn new(caches: web_sys::CacheStorage) -> Self {
        Self { caches }
    }

    async fn has(&self, generation: &str) -> CacheResult<bool> {
        let found = settle(self.caches.has(generation)).await?;
        Ok(found.as_bool().unwrap_or(false))
    }

    /// Open (creating if needed) a generation
    async fn open(&self, generation: &str) -> CacheResult<Cache> {
        settle(self.caches.open(generation))
            .await?
            .dyn_into()
            .map_err(storage_error)
    }

    /// Open a generation only if it already exists
    async fn existing(&self, generation: &str) -> CacheResult<Option<Cache>> {
        if !self.has(generation).await? {
            return Ok(None);
        }
        self.open(generation).await.map(Some)
    }

    async fn put_into(cache: &Cache, url: &str, response: &Response) -> CacheResult<()> {
        let response = to_web_response(response).map_err(storage_error)?;
        settle(cache.put_with_str(url, &response)).await?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl CacheStorage for BrowserCacheStorage {
    async fn generations(&self) -> CacheResult<Vec<String>> {
        let keys: Array = settle(self.caches.keys())
            .await?
            .dyn_into()
            .map_err(storage_error)?;
        Ok(keys.iter().filter_map(|k| k.as_string()).collect())
    }

    async fn lookup(&self, generation: &str, url: &str) -> CacheResult<Option<Response>> {
        let Some(cache) = self.existing(generation).await? else {
            return Ok(None);
        };

        let hit = settle(cache.match_with_str(url)).await?;
        if hit.is_undefined() || hit.is_null() {
            return Ok(None);
        }

        let response: web_sys::Response = hit.dyn_into().map_err(storage_error)?;
        from_web_response(&response)
            .await
            .map(Some)
            .map_err(storage_error)
    }

    async fn put(&self, generation: &str, url: &str, response: &Response) -> CacheResult<()> {
        let cache = self.open(generation).await?;
        Self::put_into(&cache, url, response).await
    }

    /// The Cache API has no transactions: entries are written one by one
    /// and, on failure, a generation created here is dropped again or the
    /// entries already written are removed from a pre-existing one.
    async fn commit(&self, generation: &str, entries: Vec<(String, Response)>) -> CacheResult<()> {
        let existed = self.has(generation).await?;
        let cache = self.open(generation).await?;

        let mut written: Vec<&str> = Vec::with_capacity(entries.len());
        for (url, response) in &entries {
            if let Err(e) = Self::put_into(&cache, url, response).await {
                if existed {
                    for url in &written {
                        let _ = settle(cache.delete_with_str(url)).await;
                    }
                } else {
                    let _ = self.delete(generation).await;
                }
                return Err(e);
            }
            written.push(url);
        }

        Ok(())
    }

    async fn delete(&self, generation: &str) -> CacheResult<bool> {
        let deleted = settle(self.caches.delete(generation)).await?;
        Ok(deleted.as_bool().unwrap_or(false))
    }

    async fn entries(&self, generation: &str) -> CacheResult<Vec<String>> {
        let Some(cache) = self.existing(generation).await? else {
            return Ok(Vec::new());
        };

        let requests: Array = settle(cache.keys())
            .await?
            .dyn_into()
            .map_err(storage_error)?;

        Ok(requests
            .iter()
            .filter_map(|r| r.dyn_into::<web_sys::Request>().ok())
            .map(|r| r.url())
            .collect())
    }
}

async fn settle(promise: Promise) -> CacheResult<JsValue> {
    JsFuture::from(promise).await.map_err(storage_error)
}

fn storage_error(err: impl Into<JsValue>) -> CacheError {
    CacheError::Storage(format!("{:?}", err.into()))
}
