//! Quote Service Client
//!
//! [`QuoteSource`] for the browser, backed by `fetch` through gloo-net.

use async_trait::async_trait;
use gloo_net::http::Request;
use habitual::quote::{Quote, QuoteError, QuotePayload, QuoteResult, QuoteSource};

pub use habitual::quote::DEFAULT_QUOTE_URL;

/// Quote source calling the public quote API
#[derive(Debug, Clone)]
pub struct BrowserQuoteSource {
    url: String,
}

impl BrowserQuoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for BrowserQuoteSource {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTE_URL)
    }
}

#[async_trait(?Send)]
impl QuoteSource for BrowserQuoteSource {
    async fn fetch_random(&self) -> QuoteResult<Quote> {
        let response = Request::get(&self.url)
            .send()
            .await
            .map_err(|e| QuoteError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(QuoteError::Api {
                status: response.status(),
            });
        }

        let payload: QuotePayload = response
            .json()
            .await
            .map_err(|e| QuoteError::Parse(e.to_string()))?;

        payload.into_quote()
    }
}
