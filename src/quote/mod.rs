//! Quote of the Day
//!
//! A daily-cached motivational quote:
//!
//! - cached quote tagged with today → used without a network call
//! - otherwise one request to the quote service
//! - any failure → uniform pick from a small local list
//!
//! Whatever is shown gets cached under today's date. A refresher re-checks
//! the tag periodically so a session left open past midnight picks up a
//! new quote within one interval.

#[cfg(feature = "native")]
mod client;
mod fetcher;
#[cfg(feature = "native")]
mod refresher;

#[cfg(feature = "native")]
pub use client::HttpQuoteSource;
pub use fetcher::{QuoteFetcher, QuoteOfTheDay, QuoteOrigin};
#[cfg(feature = "native")]
pub use refresher::QuoteRefresher;

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Random motivational quote endpoint
pub const DEFAULT_QUOTE_URL: &str =
    "https://api.quotable.io/random?tags=motivational|inspirational";

/// How often a running session re-checks the cache tag
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Local quotes used when the service cannot be reached
pub const FALLBACK_QUOTES: &[(&str, &str)] = &[
    ("Small steps every day.", "— Anonymous"),
    ("Consistency beats intensity.", "— Unknown"),
    (
        "A year from now you'll wish you had started today.",
        "— Karen Lamb",
    ),
];

/// A quote and its (possibly empty) author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default)]
    pub author: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }
}

/// Stored form of the quote of the day (`ht_quote`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedQuote {
    pub date: NaiveDate,
    pub text: String,
    #[serde(default)]
    pub author: String,
}

impl CachedQuote {
    pub fn new(quote: &Quote, date: NaiveDate) -> Self {
        Self {
            date,
            text: quote.text.clone(),
            author: quote.author.clone(),
        }
    }

    pub fn quote(&self) -> Quote {
        Quote::new(self.text.clone(), self.author.clone())
    }

    /// Whether the cache tag matches `today`
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.date == today
    }
}

/// Pick one of the [`FALLBACK_QUOTES`] uniformly at random
pub fn fallback_quote<R: Rng + ?Sized>(rng: &mut R) -> Quote {
    let (text, author) = FALLBACK_QUOTES
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_QUOTES[0]);
    Quote::new(text, author)
}

/// Errors talking to the quote service
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Quote service returned status {status}")]
    Api { status: u16 },

    #[error("Unexpected quote payload: {0}")]
    Parse(String),
}

/// Result type alias for quote operations
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Remote source of random quotes
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteSource {
    async fn fetch_random(&self) -> QuoteResult<Quote>;
}

/// Body returned by the quote service
#[derive(Debug, Deserialize)]
pub struct QuotePayload {
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
}

impl QuotePayload {
    /// Convert to a quote, rejecting an empty `content`
    pub fn into_quote(self) -> QuoteResult<Quote> {
        let text = self.content.trim().to_string();
        if text.is_empty() {
            return Err(QuoteError::Parse("empty content".to_string()));
        }
        Ok(Quote::new(text, self.author.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fallback_comes_from_list() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let quote = fallback_quote(&mut rng);
            assert!(FALLBACK_QUOTES
                .iter()
                .any(|(text, author)| quote.text == *text && quote.author == *author));
        }
    }

    #[test]
    fn test_fallback_uses_every_entry() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(fallback_quote(&mut rng).text);
        }
        assert_eq!(seen.len(), FALLBACK_QUOTES.len());
    }

    #[test]
    fn test_payload_author_optional() {
        let payload: QuotePayload =
            serde_json::from_str(r#"{"content": "Keep going."}"#).unwrap();
        assert_eq!(payload.into_quote().unwrap(), Quote::new("Keep going.", ""));
    }

    #[test]
    fn test_payload_empty_content_rejected() {
        let payload: QuotePayload =
            serde_json::from_str(r#"{"content": "  ", "author": "x"}"#).unwrap();
        assert!(matches!(payload.into_quote(), Err(QuoteError::Parse(_))));
    }

    #[test]
    fn test_cached_quote_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let cached = CachedQuote::new(&Quote::new("Hi", "Me"), date);
        assert_eq!(
            serde_json::to_value(&cached).unwrap(),
            serde_json::json!({"date": "2024-03-10", "text": "Hi", "author": "Me"})
        );
        assert!(cached.is_current(date));
        assert!(!cached.is_current(date.succ_opt().unwrap()));
    }
}
