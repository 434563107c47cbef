//! UI Components
//!
//! Reusable Leptos components for the habit tracker.

pub mod habit_form;
pub mod habit_list;
pub mod nav;
pub mod quote_card;
pub mod status_bar;
pub mod toast;
pub mod weekly_chart;

pub use habit_form::HabitForm;
pub use habit_list::HabitList;
pub use nav::Nav;
pub use quote_card::QuoteCard;
pub use status_bar::StatusBar;
pub use toast::Toast;
pub use weekly_chart::WeeklyChart;
