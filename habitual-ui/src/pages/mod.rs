//! Pages
//!
//! Top-level route views.

pub mod settings;
pub mod today;

pub use settings::Settings;
pub use today::Today;
