//! Application state
//!
//! [`HabitTracker`] owns one session: the habit repository, preferences and
//! the chart model. Opening it runs the daily reset exactly once.

use crate::habits::{
    reset_if_new_day, Clock, HabitRepository, HabitResult, ResetOutcome, WeeklySeries,
};
use crate::prefs::{AccentColor, Preferences, PrefsError, Theme};
use crate::storage::KeyValueStore;
use crate::view::{habit_rows, ChartModel, Frame, EMPTY_MESSAGE};

/// One session of the habit tracker
pub struct HabitTracker<S: KeyValueStore + Clone, C: Clock> {
    repo: HabitRepository<S, C>,
    prefs: Preferences<S>,
    chart: ChartModel,
    reset: ResetOutcome,
}

impl<S: KeyValueStore + Clone, C: Clock> HabitTracker<S, C> {
    /// Start a session
    ///
    /// Loads habits, clears done flags if the day changed since the last
    /// visit, re-derives done flags for today and records the visit.
    pub fn open(store: S, clock: C) -> HabitResult<Self> {
        let prefs = Preferences::new(store.clone());
        let mut repo = HabitRepository::load(store, clock)?;

        let reset = reset_if_new_day(&mut repo, &prefs)?;
        repo.sync_done_flags()?;
        if let Err(e) = prefs.set_last_visit(repo.today()) {
            tracing::warn!("Failed to record last visit: {}", e);
        }

        tracing::debug!(habits = repo.len(), reset = ?reset, "Session opened");
        Ok(Self {
            repo,
            prefs,
            chart: ChartModel::new(),
            reset,
        })
    }

    pub fn repo(&self) -> &HabitRepository<S, C> {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut HabitRepository<S, C> {
        &mut self.repo
    }

    pub fn prefs(&self) -> &Preferences<S> {
        &self.prefs
    }

    pub fn chart(&self) -> &ChartModel {
        &self.chart
    }

    /// What the startup reset did
    pub fn reset_outcome(&self) -> ResetOutcome {
        self.reset
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), PrefsError> {
        self.prefs.set_theme(theme)?;
        tracing::info!(theme = %theme, "Theme changed");
        Ok(())
    }

    /// Store the accent and recolor the chart
    pub fn set_accent(&mut self, accent: AccentColor) -> Result<(), PrefsError> {
        self.prefs.set_accent(&accent)?;
        self.chart.set_accent(&accent);
        tracing::info!(accent = %accent, "Accent changed");
        Ok(())
    }

    /// Build the current frame, feeding the weekly series to the chart
    pub fn render(&mut self) -> Frame {
        let today = self.repo.today();
        let accent = self.prefs.accent();
        let week = WeeklySeries::compute(self.repo.habits(), today);
        let chart_update = self.chart.update(&week, &accent);
        let rows = habit_rows(self.repo.habits(), today);

        Frame {
            today,
            theme: self.prefs.theme(),
            empty_message: rows.is_empty().then_some(EMPTY_MESSAGE),
            chart: self.chart.chart().cloned().unwrap_or_default(),
            accent,
            rows,
            week,
            chart_update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habits::{AlwaysConfirm, FixedClock};
    use crate::storage::{MemoryStore, HABITS_KEY, LAST_VISIT_KEY};
    use crate::view::ChartUpdate;

    fn clock(date: &str) -> FixedClock {
        FixedClock::parse(date).unwrap()
    }

    #[test]
    fn test_empty_render() {
        let mut tracker = HabitTracker::open(MemoryStore::new(), clock("2024-03-10")).unwrap();
        let frame = tracker.render();

        assert!(frame.rows.is_empty());
        assert_eq!(frame.empty_message, Some(EMPTY_MESSAGE));
        assert_eq!(frame.week.days().len(), 7);
        assert_eq!(frame.chart_update, ChartUpdate::Created);
        assert_eq!(frame.theme, Theme::Light);

        assert_eq!(tracker.render().chart_update, ChartUpdate::Updated);
    }

    #[test]
    fn test_open_records_visit() {
        let store = MemoryStore::new();
        let tracker = HabitTracker::open(store.clone(), clock("2024-03-10")).unwrap();
        assert_eq!(tracker.reset_outcome(), ResetOutcome::Reset { previous: None });
        assert_eq!(
            store.get(LAST_VISIT_KEY).unwrap().as_deref(),
            Some("2024-03-10")
        );

        let again = HabitTracker::open(store, clock("2024-03-10")).unwrap();
        assert_eq!(again.reset_outcome(), ResetOutcome::SameDay);
    }

    #[test]
    fn test_next_day_session_clears_done() {
        let store = MemoryStore::new();
        {
            let mut tracker = HabitTracker::open(store.clone(), clock("2024-03-10")).unwrap();
            let id = tracker.repo_mut().add("Read").unwrap().unwrap();
            tracker.repo_mut().toggle_done(&id).unwrap();
            assert!(tracker.render().rows[0].done);
        }

        let mut tracker = HabitTracker::open(store, clock("2024-03-11")).unwrap();
        let frame = tracker.render();
        assert!(!frame.rows[0].done);
        assert_eq!(frame.rows[0].total, 1);
        assert_eq!(frame.rows[0].streak, 0);
        assert_eq!(frame.week.counts(), vec![0, 0, 0, 0, 0, 1, 0]);
    }

    #[test]
    fn test_accent_flows_to_chart() {
        let mut tracker = HabitTracker::open(MemoryStore::new(), clock("2024-03-10")).unwrap();
        tracker.render();

        tracker
            .set_accent(AccentColor::parse("#2196f3").unwrap())
            .unwrap();
        assert_eq!(tracker.chart().chart().unwrap().color, "#2196f3");
        assert_eq!(tracker.render().chart.color, "#2196f3");
        assert_eq!(tracker.prefs().accent().as_str(), "#2196f3");
    }

    #[test]
    fn test_clear_renders_empty_message() {
        let mut tracker = HabitTracker::open(MemoryStore::new(), clock("2024-03-10")).unwrap();
        tracker.repo_mut().add("Read").unwrap();
        assert!(tracker.render().empty_message.is_none());

        tracker.repo_mut().clear_all(&AlwaysConfirm).unwrap();
        assert_eq!(tracker.render().empty_message, Some(EMPTY_MESSAGE));
    }

    #[test]
    fn test_open_survives_damaged_record() {
        let store = MemoryStore::new();
        store
            .set(
                HABITS_KEY,
                r#"[{"id": "a", "name": "Read", "history": ["2024-03-09"]},
                    {"id": "b", "name": "Run", "history": ["2024-02-30"]}]"#,
            )
            .unwrap();

        let mut tracker = HabitTracker::open(store, clock("2024-03-10")).unwrap();
        let frame = tracker.render();
        assert_eq!(frame.rows.len(), 2);
        assert_eq!(frame.rows[0].name, "Read");
        assert_eq!(frame.rows[1].name, "Run");
    }
}
