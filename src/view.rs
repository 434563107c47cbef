//! Render/Chart View
//!
//! Projects the habit list into display rows and a weekly bar chart.
//! Rows are rebuilt in full on every render with streak and completion
//! re-derived from history, so a stale stored streak never reaches the
//! screen. The chart is created once and afterwards updated in place.

use crate::habits::{compute_streak, Habit, HabitId, WeeklySeries};
use crate::prefs::{AccentColor, Theme};
use chrono::NaiveDate;
use serde::Serialize;

/// Shown instead of the list when there are no habits
pub const EMPTY_MESSAGE: &str = "No habits yet. Add one to get started!";

/// One rendered habit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitRow {
    pub id: HabitId,
    pub name: String,
    pub streak: u32,
    pub total: usize,
    pub done: bool,
}

impl HabitRow {
    pub fn from_habit(habit: &Habit, today: NaiveDate) -> Self {
        Self {
            id: habit.id.clone(),
            name: habit.name.clone(),
            streak: compute_streak(&habit.history, today),
            total: habit.total_completions(),
            done: habit.completed_on(today),
        }
    }

    /// Label of the toggle action
    pub fn action_label(&self) -> &'static str {
        if self.done {
            "Undo"
        } else {
            "Done"
        }
    }
}

/// Rows for every habit, in list order
pub fn habit_rows(habits: &[Habit], today: NaiveDate) -> Vec<HabitRow> {
    habits
        .iter()
        .map(|habit| HabitRow::from_habit(habit, today))
        .collect()
}

/// Data held by the bar-chart widget
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BarChart {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
    pub color: String,
}

/// What a render did to the chart widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartUpdate {
    Created,
    Updated,
}

/// The weekly bar chart, created on first render
#[derive(Debug, Clone, Default)]
pub struct ChartModel {
    chart: Option<BarChart>,
}

impl ChartModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(&self) -> Option<&BarChart> {
        self.chart.as_ref()
    }

    /// Load a new series, replacing data in place when the chart exists
    pub fn update(&mut self, series: &WeeklySeries, accent: &AccentColor) -> ChartUpdate {
        match &mut self.chart {
            Some(chart) => {
                chart.labels = series.labels();
                chart.counts = series.counts();
                chart.color = accent.to_string();
                ChartUpdate::Updated
            }
            None => {
                self.chart = Some(BarChart {
                    labels: series.labels(),
                    counts: series.counts(),
                    color: accent.to_string(),
                });
                ChartUpdate::Created
            }
        }
    }

    /// Recolor the bars; false when there is no chart yet
    pub fn set_accent(&mut self, accent: &AccentColor) -> bool {
        match &mut self.chart {
            Some(chart) => {
                chart.color = accent.to_string();
                true
            }
            None => false,
        }
    }
}

/// Everything a front end needs to draw one screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub today: NaiveDate,
    pub theme: Theme,
    pub accent: AccentColor,
    pub rows: Vec<HabitRow>,
    /// Set when `rows` is empty
    pub empty_message: Option<&'static str>,
    pub week: WeeklySeries,
    pub chart: BarChart,
    pub chart_update: ChartUpdate,
}
