//! Weekly completion series
//!
//! Derived on every render, never stored: for each of the last seven
//! calendar days (oldest first) the number of habits completed that day.

use crate::habits::types::Habit;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Number of days covered by the weekly chart
pub const WEEK_DAYS: usize = 7;

/// Completion count for one day of the series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    /// Short axis label (`MM-DD`)
    pub label: String,
    pub count: usize,
}

/// Seven-day completion series, oldest to newest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklySeries {
    days: Vec<DayCount>,
}

impl WeeklySeries {
    /// Build the series for the week ending on `today`
    pub fn compute(habits: &[Habit], today: NaiveDate) -> Self {
        let days = (0..WEEK_DAYS as i64)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(offset);
                DayCount {
                    date,
                    label: date.format("%m-%d").to_string(),
                    count: habits.iter().filter(|h| h.completed_on(date)).count(),
                }
            })
            .collect();

        Self { days }
    }

    pub fn days(&self) -> &[DayCount] {
        &self.days
    }

    pub fn labels(&self) -> Vec<String> {
        self.days.iter().map(|d| d.label.clone()).collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.days.iter().map(|d| d.count).collect()
    }

    /// Largest single-day count (0 for an empty week)
    pub fn peak(&self) -> usize {
        self.days.iter().map(|d| d.count).max().unwrap_or(0)
    }
}
