//! Network seam for the cache controller

use super::error::CacheResult;
use super::types::{Request, Response};
use async_trait::async_trait;

/// Performs live fetches
///
/// An `Err` means no response was obtained at all; HTTP error statuses come
/// back as `Ok` responses.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Network {
    async fn fetch(&self, request: &Request) -> CacheResult<Response>;
}

#[cfg(feature = "native")]
pub use http::HttpNetwork;

#[cfg(feature = "native")]
mod http {
    use super::*;
    use crate::cache::error::CacheError;
    use reqwest::{Client, Method};
    use std::time::Duration;

    /// [`Network`] over reqwest
    #[derive(Debug, Clone)]
    pub struct HttpNetwork {
        client: Client,
    }

    impl HttpNetwork {
        pub fn new(timeout: Duration) -> CacheResult<Self> {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| CacheError::Network {
                    url: String::new(),
                    reason: e.to_string(),
                })?;
            Ok(Self { client })
        }
    }

    #[async_trait]
    impl Network for HttpNetwork {
        async fn fetch(&self, request: &Request) -> CacheResult<Response> {
            let network_error = |e: reqwest::Error| CacheError::Network {
                url: request.url.clone(),
                reason: e.to_string(),
            };

            let method = Method::from_bytes(request.method.as_bytes()).map_err(|e| {
                CacheError::Network {
                    url: request.url.clone(),
                    reason: e.to_string(),
                }
            })?;

            let response = self
                .client
                .request(method, &request.url)
                .send()
                .await
                .map_err(network_error)?;

            let status = response.status();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.bytes().await.map_err(network_error)?;

            Ok(Response {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body: body.to_vec(),
            })
        }
    }
}
