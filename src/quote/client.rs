//! Quote service HTTP client

use super::{Quote, QuoteError, QuotePayload, QuoteResult, QuoteSource};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// [`QuoteSource`] backed by an unauthenticated GET
pub struct HttpQuoteSource {
    client: Client,
    url: String,
}

impl HttpQuoteSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> QuoteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QuoteError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch_random(&self) -> QuoteResult<Quote> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuoteError::Network("request timed out".to_string())
                } else {
                    QuoteError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Api {
                status: status.as_u16(),
            });
        }

        let payload: QuotePayload = response
            .json()
            .await
            .map_err(|e| QuoteError::Parse(e.to_string()))?;

        payload.into_quote()
    }
}
