//! Daily quote resolution: cache, then network, then fallback

use super::{fallback_quote, CachedQuote, Quote, QuoteSource};
use crate::prefs::Preferences;
use crate::storage::KeyValueStore;
use chrono::NaiveDate;
use serde::Serialize;

/// Where the displayed quote came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteOrigin {
    Cached,
    Network,
    Fallback,
}

/// Quote to display for a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteOfTheDay {
    pub date: NaiveDate,
    pub quote: Quote,
    pub origin: QuoteOrigin,
}

/// Resolves the quote of the day against a remote source
pub struct QuoteFetcher<Q> {
    source: Q,
}

impl<Q: QuoteSource> QuoteFetcher<Q> {
    pub fn new(source: Q) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Q {
        &self.source
    }

    /// True when no quote is cached for `today`
    pub fn needs_refresh<S: KeyValueStore>(prefs: &Preferences<S>, today: NaiveDate) -> bool {
        !prefs
            .cached_quote()
            .map(|cached| cached.is_current(today))
            .unwrap_or(false)
    }

    /// Quote for `today`
    ///
    /// At most one request is made per call, and none when today's quote
    /// is already cached. Never fails: a network or payload error yields a
    /// fallback quote, which is cached like any other.
    pub async fn quote_of_the_day<S: KeyValueStore>(
        &self,
        prefs: &Preferences<S>,
        today: NaiveDate,
    ) -> QuoteOfTheDay {
        if let Some(cached) = prefs.cached_quote().filter(|c| c.is_current(today)) {
            return QuoteOfTheDay {
                date: today,
                quote: cached.quote(),
                origin: QuoteOrigin::Cached,
            };
        }

        let (quote, origin) = match self.source.fetch_random().await {
            Ok(quote) => (quote, QuoteOrigin::Network),
            Err(e) => {
                tracing::warn!("Quote fetch failed, using fallback: {}", e);
                (fallback_quote(&mut rand::thread_rng()), QuoteOrigin::Fallback)
            }
        };

        if let Err(e) = prefs.set_cached_quote(&CachedQuote::new(&quote, today)) {
            tracing::warn!("Failed to cache quote: {}", e);
        }

        tracing::debug!(date = %today, origin = ?origin, "Resolved quote of the day");
        QuoteOfTheDay {
            date: today,
            quote,
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{QuoteError, QuoteResult, FALLBACK_QUOTES};
    use crate::storage::{KeyValueStore as _, MemoryStore, QUOTE_KEY};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubSource {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteSource for StubSource {
        async fn fetch_random(&self) -> QuoteResult<Quote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(QuoteError::Network("offline".to_string()))
            } else {
                Ok(Quote::new("Keep showing up.", "Someone"))
            }
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_cached_quote_skips_network() {
        let prefs = Preferences::new(MemoryStore::new());
        let today = day("2024-03-10");
        prefs
            .set_cached_quote(&CachedQuote::new(&Quote::new("Stored", "Me"), today))
            .unwrap();

        let fetcher = QuoteFetcher::new(StubSource::ok());
        let result = fetcher.quote_of_the_day(&prefs, today).await;

        assert_eq!(result.origin, QuoteOrigin::Cached);
        assert_eq!(result.quote.text, "Stored");
        assert_eq!(fetcher.source().calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_cache_fetches_once_and_caches() {
        let prefs = Preferences::new(MemoryStore::new());
        prefs
            .set_cached_quote(&CachedQuote::new(
                &Quote::new("Old", ""),
                day("2024-03-09"),
            ))
            .unwrap();

        let today = day("2024-03-10");
        let fetcher = QuoteFetcher::new(StubSource::ok());
        assert!(QuoteFetcher::<StubSource>::needs_refresh(&prefs, today));

        let first = fetcher.quote_of_the_day(&prefs, today).await;
        assert_eq!(first.origin, QuoteOrigin::Network);
        assert_eq!(first.quote.text, "Keep showing up.");

        let second = fetcher.quote_of_the_day(&prefs, today).await;
        assert_eq!(second.origin, QuoteOrigin::Cached);
        assert_eq!(second.quote, first.quote);
        assert_eq!(fetcher.source().calls(), 1);
        assert!(!QuoteFetcher::<StubSource>::needs_refresh(&prefs, today));
    }

    #[tokio::test]
    async fn test_failure_uses_and_caches_fallback() {
        let prefs = Preferences::new(MemoryStore::new());
        let today = day("2024-03-10");
        let fetcher = QuoteFetcher::new(StubSource::failing());

        let result = fetcher.quote_of_the_day(&prefs, today).await;
        assert_eq!(result.origin, QuoteOrigin::Fallback);
        assert!(FALLBACK_QUOTES.iter().any(|(t, _)| *t == result.quote.text));

        let cached = prefs.cached_quote().unwrap();
        assert_eq!(cached.date, today);
        assert_eq!(cached.text, result.quote.text);

        // Same day: no retry
        fetcher.quote_of_the_day(&prefs, today).await;
        assert_eq!(fetcher.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_refetched() {
        let store = MemoryStore::new();
        store.set(QUOTE_KEY, "{not json").unwrap();
        let prefs = Preferences::new(store);

        let fetcher = QuoteFetcher::new(StubSource::ok());
        let result = fetcher.quote_of_the_day(&prefs, day("2024-03-10")).await;
        assert_eq!(result.origin, QuoteOrigin::Network);
    }
}
