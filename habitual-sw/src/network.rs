//! Live fetches from inside the worker

use async_trait::async_trait;
use habitual::cache::{CacheError, CacheResult, Network};
use habitual::{Request, Response};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ServiceWorkerGlobalScope;

use crate::convert::{from_web_response, to_web_request};

/// [`Network`] backed by the worker's global `fetch`
#[derive(Clone)]
pub struct FetchNetwork {
    scope: ServiceWorkerGlobalScope,
}

impl FetchNetwork {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

#[async_trait(?Send)]
impl Network for FetchNetwork {
    async fn fetch(&self, request: &Request) -> CacheResult<Response> {
        let failed = |err: JsValue| CacheError::Network {
            url: request.url.clone(),
            reason: format!("{:?}", err),
        };

        let outgoing = to_web_request(request).map_err(failed)?;
        let response: web_sys::Response = JsFuture::from(self.scope.fetch_with_request(&outgoing))
            .await
            .map_err(failed)?
            .dyn_into()
            .map_err(failed)?;

        from_web_response(&response).await.map_err(failed)
    }
}
