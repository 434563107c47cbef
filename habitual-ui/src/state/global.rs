//! Global Application State
//!
//! One [`HabitTracker`] session over `localStorage`, shared through a Leptos
//! context. Components read the rendered [`Frame`] signal; actions go
//! through [`GlobalState`] methods, which mutate the tracker and re-render
//! when the repository reports a change.

use habitual::habits::{Clock, HabitId, SystemClock};
use habitual::prefs::Preferences;
use habitual::quote::{QuoteFetcher, QuoteOfTheDay, DEFAULT_REFRESH_INTERVAL};
use habitual::storage::{KeyValueStore, MemoryStore};
use habitual::{AccentColor, Frame, HabitTracker, Theme};
use leptos::*;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use wasm_bindgen::JsValue;

use super::local_store::LocalStore;
use crate::api::BrowserQuoteSource;
use crate::pwa::{self, BrowserConfirm, Confetti};

type Tracker = HabitTracker<LocalStore, SystemClock>;

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    /// `None` when local storage could not be opened
    tracker: Rc<RefCell<Option<Tracker>>>,
    store: Option<LocalStore>,
    /// Set by the repository listener, cleared by the next render
    dirty: Rc<Cell<bool>>,
    /// Latest rendered screen
    pub frame: RwSignal<Option<Frame>>,
    /// Quote of the day once loaded
    pub quote: RwSignal<Option<QuoteOfTheDay>>,
    /// Browser connectivity
    pub online: RwSignal<bool>,
    /// Deferred `beforeinstallprompt` event
    pub install_prompt: RwSignal<Option<JsValue>>,
    /// Outcome of the last install prompt
    pub install_status: RwSignal<Option<String>>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
}

/// Provide global state to the component tree
pub fn provide_global_state() -> GlobalState {
    let state = GlobalState::open();
    provide_context(state.clone());
    state
}

impl GlobalState {
    fn open() -> Self {
        let dirty = Rc::new(Cell::new(false));
        let error = create_rw_signal(None);

        let store = match LocalStore::open() {
            Ok(store) => Some(store),
            Err(e) => {
                web_sys::console::error_1(&format!("{}", e).into());
                error.set(Some(e.to_string()));
                None
            }
        };

        let tracker = store.clone().and_then(|store| {
            match HabitTracker::open(store, SystemClock) {
                Ok(mut tracker) => {
                    let flag = Rc::clone(&dirty);
                    tracker.repo_mut().subscribe(move |_| flag.set(true));
                    tracker.repo_mut().set_celebration(Confetti);
                    Some(tracker)
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("Failed to load habits: {}", e).into());
                    error.set(Some(format!("Failed to load habits: {}", e)));
                    None
                }
            }
        });

        let state = Self {
            tracker: Rc::new(RefCell::new(tracker)),
            store,
            dirty,
            frame: create_rw_signal(None),
            quote: create_rw_signal(None),
            online: create_rw_signal(pwa::is_online()),
            install_prompt: create_rw_signal(None),
            install_status: create_rw_signal(None),
            error,
            success: create_rw_signal(None),
        };
        state.render();
        state
    }

    /// Re-render the tracker into the frame signal
    pub fn render(&self) {
        let frame = {
            let mut tracker = self.tracker.borrow_mut();
            tracker.as_mut().map(HabitTracker::render)
        };
        self.dirty.set(false);
        self.frame.set(frame);
    }

    /// Run a mutation against the tracker, then re-render if anything changed
    ///
    /// The tracker borrow ends before any signal is set, so effects that run
    /// on the new frame never observe it borrowed.
    fn mutate<T, E: fmt::Display>(
        &self,
        op: impl FnOnce(&mut Tracker) -> Result<T, E>,
    ) -> Option<T> {
        let result = {
            let mut tracker = self.tracker.borrow_mut();
            match tracker.as_mut() {
                Some(tracker) => Some(op(tracker)),
                None => None,
            }
        };

        let value = match result {
            Some(Ok(value)) => Some(value),
            Some(Err(e)) => {
                self.show_error(&e.to_string());
                None
            }
            None => {
                self.show_error("Local storage is unavailable");
                None
            }
        };

        if self.dirty.get() {
            self.render();
        }
        value
    }

    pub fn add_habit(&self, name: &str) {
        self.mutate(|t| t.repo_mut().add(name));
    }

    pub fn toggle_habit(&self, id: &HabitId) {
        self.mutate(|t| t.repo_mut().toggle_done(id));
    }

    pub fn delete_habit(&self, id: &HabitId) {
        self.mutate(|t| t.repo_mut().delete(id, &BrowserConfirm));
    }

    pub fn clear_all(&self) {
        if let Some(true) = self.mutate(|t| t.repo_mut().clear_all(&BrowserConfirm)) {
            self.show_success("All habits cleared");
        }
    }

    /// Download the habit list as a JSON backup
    pub fn export(&self) {
        let snapshot = self
            .tracker
            .borrow()
            .as_ref()
            .map(|t| t.repo().export_snapshot());
        let Some(snapshot) = snapshot else {
            self.show_error("Local storage is unavailable");
            return;
        };

        let result = snapshot
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| {
                pwa::download_json(&snapshot.file_name(), &json).map_err(|e| format!("{:?}", e))
            });

        match result {
            Ok(()) => self.show_success("Data exported"),
            Err(e) => self.show_error(&format!("Export failed: {}", e)),
        }
    }

    /// Replace the habit list with an uploaded backup
    pub fn import(&self, document: &str) {
        let result = {
            let mut tracker = self.tracker.borrow_mut();
            tracker
                .as_mut()
                .map(|t| t.repo_mut().import_snapshot(document))
        };

        match result {
            Some(Ok(count)) => {
                self.render();
                self.show_success(&format!("Import successful ({} habits)", count));
            }
            Some(Err(e)) => self.show_error(&e.to_string()),
            None => self.show_error("Local storage is unavailable"),
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        self.dirty.set(true);
        self.mutate(|t| t.set_theme(theme));
    }

    /// Validate and store a new accent color
    pub fn set_accent(&self, value: &str) {
        let accent = match AccentColor::parse(value) {
            Ok(accent) => accent,
            Err(e) => {
                self.show_error(&e.to_string());
                return;
            }
        };
        self.dirty.set(true);
        self.mutate(|t| t.set_accent(accent));
    }

    /// Load the quote of the day in the background
    pub fn load_quote(&self) {
        let quote = self.quote;
        let store = self.store.clone();

        spawn_local(async move {
            let today = SystemClock.today();
            let shown = match store {
                Some(store) => quote_of_the_day(Preferences::new(store), today).await,
                None => quote_of_the_day(Preferences::new(MemoryStore::new()), today).await,
            };
            quote.set(Some(shown));
        });
    }

    /// Re-check the cached quote's date every refresh interval
    pub fn start_quote_refresh(&self) {
        let state = self.clone();
        let millis = DEFAULT_REFRESH_INTERVAL.as_millis() as u32;

        gloo_timers::callback::Interval::new(millis, move || {
            if state.quote_is_stale() {
                state.load_quote();
            }
        })
        .forget();
    }

    fn quote_is_stale(&self) -> bool {
        let today = SystemClock.today();
        match &self.store {
            Some(store) => QuoteFetcher::<BrowserQuoteSource>::needs_refresh(
                &Preferences::new(store.clone()),
                today,
            ),
            None => self
                .quote
                .get_untracked()
                .map_or(true, |shown| shown.date != today),
        }
    }

    /// Show the deferred install prompt and record the user's choice
    pub fn prompt_install(&self) {
        let Some(event) = self.install_prompt.get_untracked() else {
            return;
        };

        let state = self.clone();
        spawn_local(async move {
            let status = match pwa::show_install_prompt(&event).await {
                Ok(outcome) if outcome == "accepted" => "App installed".to_string(),
                Ok(_) => "Prompt dismissed".to_string(),
                Err(e) => {
                    web_sys::console::warn_1(&e);
                    "Install prompt failed".to_string()
                }
            };
            state.install_prompt.set(None);
            state.install_status.set(Some(status));
        });
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        })
        .forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        })
        .forget();
    }
}

async fn quote_of_the_day<S: KeyValueStore>(
    prefs: Preferences<S>,
    today: chrono::NaiveDate,
) -> QuoteOfTheDay {
    QuoteFetcher::new(BrowserQuoteSource::default())
        .quote_of_the_day(&prefs, today)
        .await
}
