//! # Habitual
//!
//! Offline-first habit tracker: daily check-offs, streaks, a seven-day
//! chart and a quote of the day, backed by a single key-value store.
//!
//! ## Features
//!
//! - **Streaks**: Consecutive-day runs derived from completion history
//! - **Daily reset**: Done flags cleared once per new calendar day
//! - **Portable data**: Schema-validated JSON export/import
//! - **Offline shell**: Cache controller for the installable background worker
//! - **Quote of the day**: Network-first with a local fallback, cached per day
//!
//! ## Modules
//!
//! - [`storage`]: Key-value store abstraction (memory, file)
//! - [`habits`]: Habit model, streak engine, repository, reset, snapshots
//! - [`prefs`]: Theme, accent, last visit and cached quote
//! - [`view`]: Display rows and weekly chart model
//! - [`app`]: Session state tying the above together
//! - [`quote`]: Quote fetcher and refresher
//! - [`cache`]: App-shell cache controller
//! - [`config`]: TOML and environment configuration (native only)
//!
//! Everything except file storage, HTTP clients, configuration and the
//! tokio refresher also builds for `wasm32-unknown-unknown` with
//! `default-features = false`.
//!
//! ## Quick Start
//!
//! ```rust
//! use habitual::habits::FixedClock;
//! use habitual::storage::MemoryStore;
//! use habitual::HabitTracker;
//!
//! let clock = FixedClock::parse("2024-03-10").unwrap();
//! let mut tracker = HabitTracker::open(MemoryStore::new(), clock).unwrap();
//!
//! let id = tracker.repo_mut().add("Read").unwrap().unwrap();
//! tracker.repo_mut().toggle_done(&id).unwrap();
//!
//! let frame = tracker.render();
//! assert_eq!(frame.rows[0].streak, 1);
//! assert_eq!(frame.week.counts().last(), Some(&1));
//! ```

pub mod app;
pub mod cache;
#[cfg(feature = "native")]
pub mod config;
pub mod habits;
pub mod prefs;
pub mod quote;
pub mod storage;
pub mod view;

// Re-export top-level types for convenience
pub use app::HabitTracker;

pub use storage::{KeyValueStore, KeyValueStoreExt, MemoryStore, StorageError, StorageResult};
#[cfg(feature = "native")]
pub use storage::FileStore;

pub use habits::{
    compute_streak, Clock, FixedClock, Habit, HabitError, HabitId, HabitRepository, HabitResult,
    Snapshot, SnapshotError, SystemClock, WeeklySeries,
};

pub use prefs::{AccentColor, Preferences, PrefsError, Theme};

pub use view::{BarChart, ChartModel, ChartUpdate, Frame, HabitRow};

pub use quote::{
    CachedQuote, Quote, QuoteError, QuoteFetcher, QuoteOfTheDay, QuoteOrigin, QuoteSource,
};

pub use cache::{
    AssetManifest, CacheController, CacheError, CacheResult, CacheStorage, MemoryCacheStorage,
    Network, Origin, Request, Response, WorkerHost, WorkerState,
};

#[cfg(feature = "native")]
pub use config::{Config, ConfigError, LoggingConfig};
