//! Quote Refresher
//!
//! Re-checks the quote cache tag on a fixed interval so a long-running
//! session rolls over to a new quote shortly after midnight.

use super::{QuoteFetcher, QuoteOfTheDay, QuoteSource, DEFAULT_REFRESH_INTERVAL};
use crate::habits::Clock;
use crate::prefs::Preferences;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};

/// Background task publishing the current quote of the day
pub struct QuoteRefresher<Q, S: KeyValueStore, C> {
    fetcher: QuoteFetcher<Q>,
    prefs: Preferences<S>,
    clock: C,
    interval: Duration,
    running: Arc<RwLock<bool>>,
    current: watch::Sender<Option<QuoteOfTheDay>>,
}

impl<Q, S, C> QuoteRefresher<Q, S, C>
where
    Q: QuoteSource + Send + Sync + 'static,
    S: KeyValueStore + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    pub fn new(fetcher: QuoteFetcher<Q>, prefs: Preferences<S>, clock: C) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            fetcher,
            prefs,
            clock,
            interval: DEFAULT_REFRESH_INTERVAL,
            running: Arc::new(RwLock::new(false)),
            current,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Receiver that sees every quote the refresher publishes
    pub fn subscribe(&self) -> watch::Receiver<Option<QuoteOfTheDay>> {
        self.current.subscribe()
    }

    /// Resolve today's quote and publish it if it changed
    pub async fn check_now(&self) -> QuoteOfTheDay {
        let today = self.clock.today();
        let quote = self.fetcher.quote_of_the_day(&self.prefs, today).await;

        self.current.send_if_modified(|current| {
            let changed = current
                .as_ref()
                .map(|c| c.date != quote.date || c.quote != quote.quote)
                .unwrap_or(true);
            if changed {
                tracing::info!(date = %quote.date, origin = ?quote.origin, "Quote of the day updated");
                *current = Some(quote.clone());
            }
            changed
        });

        quote
    }

    /// Start the refresher background task
    ///
    /// The first tick fires immediately, so the quote is resolved at startup.
    /// The running flag is raised before the task is spawned, so a `stop()`
    /// issued right after `start()` always wins.
    pub async fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        *self.running.write().await = true;
        let refresher = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(refresher.interval);

            loop {
                interval.tick().await;

                if !*refresher.running.read().await {
                    break;
                }

                refresher.check_now().await;
            }
        })
    }

    /// Stop after the current tick
    pub async fn stop(&self) {
        *self.running.write().await = false;
    }
}
