//! Habit Repository
//!
//! In-memory habit list kept in sync with the persistent store. Every
//! mutation builds the next list, writes it whole under
//! [`HABITS_KEY`](crate::storage::HABITS_KEY), and only then adopts it and
//! notifies the registered change listeners, which is how front ends
//! re-render. A failed write leaves memory and storage as they were.
//!
//! Destructive operations ask a [`Confirm`] collaborator first. Completing
//! the last open habit of the day fires the [`Celebration`] collaborator on
//! a best-effort basis.

use crate::habits::clock::Clock;
use crate::habits::error::HabitResult;
use crate::habits::snapshot::{recover_stored, Snapshot};
use crate::habits::types::{Habit, HabitId};
use crate::storage::{KeyValueStore, KeyValueStoreExt, StorageError, HABITS_KEY};
use chrono::NaiveDate;

/// Prompt shown before deleting a single habit
pub const DELETE_PROMPT: &str = "Delete this habit?";
/// Prompt shown before clearing every habit
pub const CLEAR_PROMPT: &str = "Clear all habits and history?";

/// Asks the user to approve a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Approves everything (`--yes` on the command line)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Failure of a purely cosmetic celebration effect
#[derive(Debug, thiserror::Error)]
#[error("Celebration failed: {0}")]
pub struct CelebrationError(pub String);

/// Cosmetic effect fired when every habit is done for the day
pub trait Celebration {
    fn celebrate(&self) -> Result<(), CelebrationError>;
}

type ChangeListener = Box<dyn FnMut(&[Habit])>;

/// The habit list and its persistence
pub struct HabitRepository<S: KeyValueStore, C: Clock> {
    store: S,
    clock: C,
    habits: Vec<Habit>,
    listeners: Vec<ChangeListener>,
    celebration: Option<Box<dyn Celebration>>,
}

impl<S: KeyValueStore, C: Clock> HabitRepository<S, C> {
    /// Load the stored habit list (empty when nothing is stored yet)
    ///
    /// Damaged records are repaired or skipped, and an unreadable list
    /// loads as empty; only a store that cannot be read at all fails.
    pub fn load(store: S, clock: C) -> HabitResult<Self> {
        let habits = match store.get_json::<serde_json::Value>(HABITS_KEY) {
            Ok(Some(value)) => recover_stored(value, clock.today()),
            Ok(None) => Vec::new(),
            Err(StorageError::Corruption { reason, .. }) => {
                tracing::warn!("Stored habit list unreadable, starting empty: {}", reason);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(count = habits.len(), "Loaded habits");

        Ok(Self {
            store,
            clock,
            habits,
            listeners: Vec::new(),
            celebration: None,
        })
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| &h.id == id)
    }

    /// Find a habit by id, or failing that by case-insensitive name
    pub fn find(&self, id_or_name: &str) -> Option<&Habit> {
        self.habits
            .iter()
            .find(|h| h.id.as_str() == id_or_name)
            .or_else(|| {
                self.habits
                    .iter()
                    .find(|h| h.name.eq_ignore_ascii_case(id_or_name.trim()))
            })
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a listener called with the full list after each mutation
    pub fn subscribe(&mut self, listener: impl FnMut(&[Habit]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Install the all-done celebration effect
    pub fn set_celebration(&mut self, celebration: impl Celebration + 'static) {
        self.celebration = Some(Box::new(celebration));
    }

    /// Add a habit; blank names are ignored and return `None`
    pub fn add(&mut self, name: &str) -> HabitResult<Option<HabitId>> {
        let clean = name.trim();
        if clean.is_empty() {
            return Ok(None);
        }

        let habit = Habit::new(clean);
        let id = habit.id.clone();
        let mut next = self.habits.clone();
        next.push(habit);
        self.commit(next)?;

        tracing::info!(habit = %id, name = clean, "Added habit");
        Ok(Some(id))
    }

    /// Toggle today's completion; returns the new `done` flag, or `None`
    /// when the id is unknown
    pub fn toggle_done(&mut self, id: &HabitId) -> HabitResult<Option<bool>> {
        let today = self.clock.today();
        let Some(index) = self.habits.iter().position(|h| &h.id == id) else {
            return Ok(None);
        };

        let mut next = self.habits.clone();
        let done = next[index].toggle(today);
        let streak = next[index].streak;
        self.commit(next)?;
        tracing::debug!(habit = %id, done, streak, "Toggled habit");

        if done {
            self.celebrate_if_all_done();
        }
        Ok(Some(done))
    }

    /// Delete a habit after confirmation; returns whether it was removed
    pub fn delete(&mut self, id: &HabitId, confirm: &dyn Confirm) -> HabitResult<bool> {
        if self.get(id).is_none() || !confirm.confirm(DELETE_PROMPT) {
            return Ok(false);
        }

        let next = self.habits.iter().filter(|h| &h.id != id).cloned().collect();
        self.commit(next)?;
        tracing::info!(habit = %id, "Deleted habit");
        Ok(true)
    }

    /// Remove every habit after confirmation
    pub fn clear_all(&mut self, confirm: &dyn Confirm) -> HabitResult<bool> {
        if !confirm.confirm(CLEAR_PROMPT) {
            return Ok(false);
        }

        let removed = self.habits.len();
        self.commit(Vec::new())?;
        tracing::info!(removed, "Cleared all habits");
        Ok(true)
    }

    /// Snapshot of the current list for download
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot::new(self.habits.clone(), self.clock.now())
    }

    /// Replace the whole list with the habits of an import document
    ///
    /// The document is validated before anything changes; on error the
    /// current list and the stored copy are left untouched.
    pub fn import_snapshot(&mut self, document: &str) -> HabitResult<usize> {
        let habits = Snapshot::parse_habits(document, self.clock.today())?;
        let count = habits.len();

        self.commit(habits)?;
        tracing::info!(count, "Imported habits");
        Ok(count)
    }

    /// Clear every `done` flag without touching history; persists
    pub fn reset_done_flags(&mut self) -> HabitResult<()> {
        let mut next = self.habits.clone();
        for habit in &mut next {
            habit.done = false;
        }
        self.persist(next)
    }

    /// Re-derive `done` from history for today; persists only on change
    pub fn sync_done_flags(&mut self) -> HabitResult<()> {
        let today = self.clock.today();
        let mut next = self.habits.clone();
        let mut changed = false;
        for habit in &mut next {
            let done = habit.completed_on(today);
            changed |= habit.done != done;
            habit.done = done;
        }
        if changed {
            self.persist(next)?;
        }
        Ok(())
    }

    /// True when there is at least one habit and all are completed today
    pub fn all_done_today(&self) -> bool {
        let today = self.clock.today();
        !self.habits.is_empty() && self.habits.iter().all(|h| h.completed_on(today))
    }

    fn celebrate_if_all_done(&self) {
        if !self.all_done_today() {
            return;
        }
        if let Some(celebration) = &self.celebration {
            if let Err(e) = celebration.celebrate() {
                tracing::debug!("Ignoring celebration failure: {}", e);
            }
        }
    }

    /// Store `next`, then adopt it
    fn persist(&mut self, next: Vec<Habit>) -> HabitResult<()> {
        self.store.set_json(HABITS_KEY, &next)?;
        self.habits = next;
        Ok(())
    }

    fn commit(&mut self, next: Vec<Habit>) -> HabitResult<()> {
        self.persist(next)?;
        for listener in &mut self.listeners {
            listener(&self.habits);
        }
        Ok(())
    }
}
