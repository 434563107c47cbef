//! Core habit data types
//!
//! - `HabitId`: opaque unique identifier
//! - `Habit`: a tracked habit with its completion history
//!
//! The serialized shape (`id`, `name`, `streak`, `history`, `done`) is the
//! one stored under `ht_habits_v1` and embedded in export documents.

use crate::habits::streak::compute_streak;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Opaque habit identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HabitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for HabitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A user-defined habit tracked per calendar day
///
/// `streak` and `done` are derived from `history` and are refreshed with
/// [`Habit::refresh`] whenever the history or the current day changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default)]
    pub streak: u32,
    /// Days on which the habit was completed
    #[serde(default)]
    pub history: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub done: bool,
}

impl Habit {
    /// Create a habit with a fresh id and an empty history
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: HabitId::generate(),
            name: name.into(),
            streak: 0,
            history: BTreeSet::new(),
            done: false,
        }
    }

    /// Builder method: record completions (recomputes derived fields)
    pub fn with_history(
        mut self,
        days: impl IntoIterator<Item = NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        self.history.extend(days);
        self.refresh(today);
        self
    }

    /// Whether the habit was completed on `date`
    pub fn completed_on(&self, date: NaiveDate) -> bool {
        self.history.contains(&date)
    }

    /// Total number of days the habit was completed
    pub fn total_completions(&self) -> usize {
        self.history.len()
    }

    /// Flip today's completion; returns the new `done` value
    pub fn toggle(&mut self, today: NaiveDate) -> bool {
        if !self.history.remove(&today) {
            self.history.insert(today);
        }
        self.refresh(today);
        self.done
    }

    /// Recompute `streak` and `done` for `today`
    pub fn refresh(&mut self, today: NaiveDate) {
        self.streak = compute_streak(&self.history, today);
        self.done = self.history.contains(&today);
    }
}
