//! User preferences
//!
//! Typed access to the non-habit entries of the store: theme, accent color,
//! last visit date and the cached quote of the day. Missing or unreadable
//! values fall back to defaults on read; writes validate first.

use crate::quote::CachedQuote;
use crate::storage::{
    KeyValueStore, KeyValueStoreExt, StorageError, ACCENT_KEY, LAST_VISIT_KEY, QUOTE_KEY,
    THEME_KEY,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Default accent color
pub const DEFAULT_ACCENT: &str = "#4CAF50";

/// Color theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[Theme::Light, Theme::Dark]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Stylesheet swapped in for this theme
    pub fn stylesheet_href(&self) -> String {
        format!("css/{}.css", self.as_str())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = PrefsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(PrefsError::InvalidTheme(other.to_string())),
        }
    }
}

/// Accent color as a CSS hex string (`#rgb` or `#rrggbb`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccentColor(String);

fn hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("static regex is valid")
    })
}

impl AccentColor {
    pub fn parse(value: &str) -> Result<Self, PrefsError> {
        let value = value.trim();
        if hex_pattern().is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(PrefsError::InvalidAccent(value.to_string()))
        }
    }

    /// Parse, falling back to the default accent for anything unusable
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AccentColor {
    fn default() -> Self {
        Self(DEFAULT_ACCENT.to_string())
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccentColor {
    type Error = PrefsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccentColor> for String {
    fn from(value: AccentColor) -> Self {
        value.0
    }
}

/// Preference errors
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("Unknown theme: {0} (expected light or dark)")]
    InvalidTheme(String),

    #[error("Invalid accent color: {0} (expected #rgb or #rrggbb)")]
    InvalidAccent(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Preferences view over a key-value store
#[derive(Debug, Clone)]
pub struct Preferences<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored theme, `light` when missing or unreadable
    pub fn theme(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring stored theme: {}", e);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!("Failed to read theme: {}", e);
                Theme::default()
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), PrefsError> {
        self.store.set(THEME_KEY, theme.as_str())?;
        Ok(())
    }

    /// Stored accent, the default accent when missing or not a hex color
    pub fn accent(&self) -> AccentColor {
        match self.store.get(ACCENT_KEY) {
            Ok(Some(raw)) => AccentColor::parse_or_default(&raw),
            Ok(None) => AccentColor::default(),
            Err(e) => {
                tracing::warn!("Failed to read accent: {}", e);
                AccentColor::default()
            }
        }
    }

    pub fn set_accent(&self, accent: &AccentColor) -> Result<(), PrefsError> {
        self.store.set(ACCENT_KEY, accent.as_str())?;
        Ok(())
    }

    /// Date of the previous session, if any
    pub fn last_visit(&self) -> Option<NaiveDate> {
        match self.store.get(LAST_VISIT_KEY) {
            Ok(Some(raw)) => raw.trim().parse().ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read last visit: {}", e);
                None
            }
        }
    }

    pub fn set_last_visit(&self, date: NaiveDate) -> Result<(), PrefsError> {
        self.store
            .set(LAST_VISIT_KEY, &date.format("%Y-%m-%d").to_string())?;
        Ok(())
    }

    /// Cached quote of the day, if one is stored and readable
    pub fn cached_quote(&self) -> Option<CachedQuote> {
        match self.store.get_json(QUOTE_KEY) {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!("Ignoring cached quote: {}", e);
                None
            }
        }
    }

    pub fn set_cached_quote(&self, quote: &CachedQuote) -> Result<(), PrefsError> {
        self.store.set_json(QUOTE_KEY, quote)?;
        Ok(())
    }
}
