//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `HABITUAL_*` environment overrides.

use crate::cache::DEFAULT_GENERATION;
use crate::quote::DEFAULT_QUOTE_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub quote: QuoteConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Habit store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("habitual").to_string_lossy().to_string())
        .unwrap_or_else(|| "./habitual_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Quote of the day configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteConfig {
    #[serde(default = "default_quote_url")]
    pub url: String,

    #[serde(default = "default_quote_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_mins: u64,
}

fn default_quote_url() -> String {
    DEFAULT_QUOTE_URL.to_string()
}

fn default_quote_timeout() -> u64 {
    10
}

fn default_refresh_interval() -> u64 {
    30
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            url: default_quote_url(),
            timeout_secs: default_quote_timeout(),
            refresh_interval_mins: default_refresh_interval(),
        }
    }
}

impl QuoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Recheck interval, never shorter than one minute
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_mins.max(1) * 60)
    }
}

/// Offline bundle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Origin the app shell is served from
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Bundle directory; defaults to `<data_dir>/offline-cache`
    pub dir: Option<String>,

    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

fn default_generation() -> String {
    DEFAULT_GENERATION.to_string()
}

fn default_origin() -> String {
    "http://localhost:8080".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            generation: default_generation(),
            origin: default_origin(),
            dir: None,
            timeout_secs: default_fetch_timeout(),
        }
    }
}

impl CacheConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("habitual").join("config.toml")),
            Some(PathBuf::from("./habitual.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Directory holding the on-disk offline bundle
    pub fn cache_dir(&self) -> PathBuf {
        match &self.cache.dir {
            Some(dir) => PathBuf::from(dir),
            None => Path::new(&self.storage.data_dir).join("offline-cache"),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `HABITUAL_*` overrides read through `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = lookup("HABITUAL_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Some(url) = lookup("HABITUAL_QUOTE_URL") {
            self.quote.url = url;
        }

        if let Some(generation) = lookup("HABITUAL_CACHE_GENERATION") {
            self.cache.generation = generation;
        }
        if let Some(origin) = lookup("HABITUAL_CACHE_ORIGIN") {
            self.cache.origin = origin;
        }

        if let Some(level) = lookup("HABITUAL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("HABITUAL_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Habitual Configuration
#
# Environment variables override these settings:
# - HABITUAL_DATA_DIR
# - HABITUAL_QUOTE_URL
# - HABITUAL_CACHE_GENERATION
# - HABITUAL_CACHE_ORIGIN
# - HABITUAL_LOG_LEVEL
# - HABITUAL_LOG_FORMAT

[storage]
# Directory holding store.json (habits, theme, accent, last visit, quote)
data_dir = "~/.local/share/habitual"

[quote]
# Random quote endpoint (GET, returns {"content": ..., "author": ...})
url = "https://api.quotable.io/random?tags=motivational|inspirational"

# Request timeout in seconds
timeout_secs = 10

# How often a long-running session rechecks the day (minutes)
refresh_interval_mins = 30

[cache]
# Current cache generation; activation deletes every other one
generation = "habit-tracker-cache-v2"

# Origin the app shell is served from
origin = "http://localhost:8080"

# Offline bundle directory (defaults to <data_dir>/offline-cache)
# dir = "/var/cache/habitual"

# Per-request timeout in seconds
timeout_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.quote.url, DEFAULT_QUOTE_URL);
        assert_eq!(config.quote.refresh_interval(), Duration::from_secs(30 * 60));
        assert_eq!(config.cache.generation, "habit-tracker-cache-v2");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.quote.timeout_secs, 10);
        assert_eq!(config.cache.origin, "http://localhost:8080");
        assert!(config.cache.dir.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("habitual.toml");
        std::fs::write(&path, "[storage]\ndata_dir = \"/tmp/h\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/h");
        assert_eq!(config.cache_dir(), PathBuf::from("/tmp/h/offline-cache"));
        assert_eq!(config.quote.refresh_interval_mins, 30);
    }

    #[test]
    fn test_bad_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("habitual.toml");
        std::fs::write(&path, "[quote\nurl = 1").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HABITUAL_DATA_DIR", "/data"),
            ("HABITUAL_CACHE_ORIGIN", "https://habits.example"),
            ("HABITUAL_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/data");
        assert_eq!(config.cache.origin, "https://habits.example");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_refresh_interval_floor() {
        let quote = QuoteConfig {
            refresh_interval_mins: 0,
            ..QuoteConfig::default()
        };
        assert_eq!(quote.refresh_interval(), Duration::from_secs(60));
    }
}
