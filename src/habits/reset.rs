//! Daily Reset Controller
//!
//! Runs once per session, before the first render. When the calendar day
//! has moved on since the last visit, every `done` flag is cleared. History
//! and the stored streak are left alone; the view re-derives the streak it
//! displays.

use crate::habits::clock::Clock;
use crate::habits::error::HabitResult;
use crate::habits::repository::HabitRepository;
use crate::prefs::Preferences;
use crate::storage::KeyValueStore;
use chrono::NaiveDate;

/// What the reset check did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Same day as the last visit; nothing changed
    SameDay,
    /// Day changed (or first visit); done flags were cleared
    Reset { previous: Option<NaiveDate> },
}

/// Clear done flags if the day changed since the last visit
///
/// Idempotent within a day: the first call records today as the last
/// visit, so later calls on the same day report [`ResetOutcome::SameDay`].
pub fn reset_if_new_day<S, C, P>(
    repo: &mut HabitRepository<S, C>,
    prefs: &Preferences<P>,
) -> HabitResult<ResetOutcome>
where
    S: KeyValueStore,
    C: Clock,
    P: KeyValueStore,
{
    let today = repo.today();
    let previous = prefs.last_visit();

    if previous == Some(today) {
        return Ok(ResetOutcome::SameDay);
    }

    repo.reset_done_flags()?;
    if let Err(e) = prefs.set_last_visit(today) {
        tracing::warn!("Failed to record last visit: {}", e);
    }

    tracing::info!(
        previous = ?previous,
        today = %today,
        habits = repo.len(),
        "New day, cleared done flags"
    );
    Ok(ResetOutcome::Reset { previous })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habits::clock::FixedClock;
    use crate::habits::types::Habit;
    use crate::storage::MemoryStore;

    fn monday() -> FixedClock {
        FixedClock::parse("2024-03-11").unwrap()
    }

    fn tuesday() -> FixedClock {
        FixedClock::parse("2024-03-12").unwrap()
    }

    #[test]
    fn test_first_visit_resets_and_records() {
        let store = MemoryStore::new();
        let prefs = Preferences::new(store.clone());
        let mut repo = HabitRepository::load(store.clone(), monday()).unwrap();

        let outcome = reset_if_new_day(&mut repo, &prefs).unwrap();
        assert_eq!(outcome, ResetOutcome::Reset { previous: None });
        assert_eq!(prefs.last_visit(), Some(monday().today()));
    }

    #[test]
    fn test_same_day_is_noop() {
        let store = MemoryStore::new();
        let prefs = Preferences::new(store.clone());
        let mut repo = HabitRepository::load(store.clone(), monday()).unwrap();

        reset_if_new_day(&mut repo, &prefs).unwrap();
        let id = repo.add("Read").unwrap().unwrap();
        repo.toggle_done(&id).unwrap();

        assert_eq!(
            reset_if_new_day(&mut repo, &prefs).unwrap(),
            ResetOutcome::SameDay
        );
        assert!(repo.get(&id).unwrap().done);
    }

    #[test]
    fn test_new_day_clears_done_but_keeps_history_and_streak() {
        let store = MemoryStore::new();
        let prefs = Preferences::new(store.clone());

        // Monday: complete two habits
        let before: Vec<Habit> = {
            let mut repo = HabitRepository::load(store.clone(), monday()).unwrap();
            reset_if_new_day(&mut repo, &prefs).unwrap();
            let a = repo.add("Read").unwrap().unwrap();
            let b = repo.add("Run").unwrap().unwrap();
            repo.toggle_done(&a).unwrap();
            repo.toggle_done(&b).unwrap();
            repo.habits().to_vec()
        };

        // Tuesday: new session
        let mut repo = HabitRepository::load(store.clone(), tuesday()).unwrap();
        let outcome = reset_if_new_day(&mut repo, &prefs).unwrap();
        assert_eq!(
            outcome,
            ResetOutcome::Reset {
                previous: Some(monday().today())
            }
        );

        for (after, before) in repo.habits().iter().zip(&before) {
            assert!(!after.done);
            assert_eq!(after.history, before.history);
            assert_eq!(after.streak, before.streak);
        }

        // And the reset was persisted
        let reloaded = HabitRepository::load(store, tuesday()).unwrap();
        assert!(reloaded.habits().iter().all(|h| !h.done));
    }
}
