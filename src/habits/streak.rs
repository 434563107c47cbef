//! Streak Engine
//!
//! Pure functions over a completion history. Granularity is the calendar
//! day: crossing midnight changes the answer, elapsed hours do not.

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Number of consecutive completed days ending today
///
/// Walks backward from `today` and stops at the first day missing from
/// `history`, so a history without `today` always yields 0.
pub fn compute_streak(history: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;

    while history.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }

    streak
}

/// Longest run of consecutive completed days anywhere in the history
pub fn longest_streak(history: &BTreeSet<NaiveDate>) -> u32 {
    let mut best = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in history {
        current = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => current + 1,
            _ => 1,
        };
        best = best.max(current);
        previous = Some(day);
    }

    best
}
