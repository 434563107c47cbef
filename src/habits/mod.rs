//! Habit tracking core
//!
//! - **types**: `Habit` and `HabitId`
//! - **clock**: Source of "today"
//! - **streak**: Streak engine
//! - **reset**: Daily reset controller
//! - **repository**: Habit list synchronized to the store
//! - **snapshot**: Export/import documents
//! - **weekly**: Seven-day completion series
//! - **error**: Error types
//!
//! # Flow
//!
//! ```text
//! UI event → HabitRepository mutation → store write → listeners (re-render)
//! ```
//!
//! # Example
//!
//! ```rust
//! use habitual::habits::{FixedClock, HabitRepository};
//! use habitual::storage::MemoryStore;
//!
//! let clock = FixedClock::parse("2024-03-01").unwrap();
//! let mut repo = HabitRepository::load(MemoryStore::new(), clock).unwrap();
//!
//! let id = repo.add("Read").unwrap().unwrap();
//! repo.toggle_done(&id).unwrap();
//!
//! assert_eq!(repo.get(&id).unwrap().streak, 1);
//! ```

pub mod clock;
pub mod error;
pub mod repository;
pub mod reset;
pub mod snapshot;
pub mod streak;
pub mod types;
pub mod weekly;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{HabitError, HabitResult, SnapshotError};
pub use repository::{
    AlwaysConfirm, Celebration, CelebrationError, Confirm, HabitRepository, CLEAR_PROMPT,
    DELETE_PROMPT,
};
pub use reset::{reset_if_new_day, ResetOutcome};
pub use snapshot::Snapshot;
pub use streak::{compute_streak, longest_streak};
pub use types::{Habit, HabitId};
pub use weekly::{DayCount, WeeklySeries, WEEK_DAYS};
