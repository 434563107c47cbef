//! Worker global scope as a [`WorkerHost`]

use async_trait::async_trait;
use habitual::cache::{CacheError, CacheResult, WorkerHost};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::ServiceWorkerGlobalScope;

#[derive(Clone)]
pub struct ScopeHost {
    scope: ServiceWorkerGlobalScope,
}

impl ScopeHost {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

#[async_trait(?Send)]
impl WorkerHost for ScopeHost {
    async fn skip_waiting(&self) -> CacheResult<()> {
        let promise = self.scope.skip_waiting().map_err(host_error)?;
        JsFuture::from(promise).await.map_err(host_error)?;
        Ok(())
    }

    async fn claim_clients(&self) -> CacheResult<()> {
        JsFuture::from(self.scope.clients().claim())
            .await
            .map_err(host_error)?;
        Ok(())
    }
}

fn host_error(err: JsValue) -> CacheError {
    CacheError::Storage(format!("worker scope: {:?}", err))
}
