//! Request/response model shared by the cache backends

use super::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the page issued the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level page navigation
    Navigate,
    SameOrigin,
    Cors,
    NoCors,
}

/// An intercepted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Absolute URL
    pub url: String,
    pub method: String,
    pub mode: RequestMode,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            mode: RequestMode::Cors,
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            mode: RequestMode::Navigate,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into().to_ascii_uppercase();
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Only GET responses can be stored in a cache
    pub fn is_cacheable(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

/// A response as stored in, or served from, the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Synthetic reply when neither cache nor network can answer
    pub fn service_unavailable() -> Self {
        Self {
            status: 503,
            status_text: "offline".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 2xx status
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with `name`, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Scheme and authority of the worker's scope, e.g. `https://habits.example`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin(String);

impl Origin {
    /// Parse the origin out of an absolute http(s) URL
    pub fn parse(url: &str) -> CacheResult<Self> {
        let url = url.trim();
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| CacheError::InvalidOrigin(url.to_string()))?;

        let scheme = scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(CacheError::InvalidOrigin(url.to_string()));
        }

        let authority = rest
            .split(|c| c == '/' || c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        if authority.is_empty() {
            return Err(CacheError::InvalidOrigin(url.to_string()));
        }

        Ok(Self(format!(
            "{}://{}",
            scheme,
            authority.to_ascii_lowercase()
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute URL for a manifest entry; absolute entries pass through
    pub fn resolve(&self, path: &str) -> String {
        if path.contains("://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.0, path)
        } else {
            format!("{}/{}", self.0, path)
        }
    }

    /// Whether `url` belongs to this origin
    pub fn contains(&self, url: &str) -> bool {
        match url.strip_prefix(self.0.as_str()) {
            Some(rest) => {
                rest.is_empty()
                    || rest.starts_with('/')
                    || rest.starts_with('?')
                    || rest.starts_with('#')
            }
            None => false,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_parse() {
        let origin = Origin::parse("HTTPS://Habits.Example/app/index.html?x=1").unwrap();
        assert_eq!(origin.as_str(), "https://habits.example");

        let origin = Origin::parse("http://localhost:8080").unwrap();
        assert_eq!(origin.as_str(), "http://localhost:8080");

        assert!(Origin::parse("ftp://files.example").is_err());
        assert!(Origin::parse("habits.example").is_err());
        assert!(Origin::parse("https:///index.html").is_err());
    }

    #[test]
    fn test_origin_resolve() {
        let origin = Origin::parse("https://habits.example").unwrap();
        assert_eq!(origin.resolve("/"), "https://habits.example/");
        assert_eq!(origin.resolve("/index.html"), "https://habits.example/index.html");
        assert_eq!(origin.resolve("manifest.json"), "https://habits.example/manifest.json");
        assert_eq!(
            origin.resolve("https://cdn.jsdelivr.net/npm/chart.js"),
            "https://cdn.jsdelivr.net/npm/chart.js"
        );
    }

    #[test]
    fn test_origin_contains() {
        let origin = Origin::parse("https://habits.example").unwrap();
        assert!(origin.contains("https://habits.example/"));
        assert!(origin.contains("https://habits.example/css/base.css"));
        assert!(origin.contains("https://habits.example?pwa=1"));
        assert!(!origin.contains("https://habits.example.evil.test/"));
        assert!(!origin.contains("https://cdn.jsdelivr.net/npm/chart.js"));
        assert!(!origin.contains("http://habits.example/"));
    }

    #[test]
    fn test_response_helpers() {
        let offline = Response::service_unavailable();
        assert_eq!(offline.status, 503);
        assert_eq!(offline.status_text, "offline");
        assert!(!offline.ok());

        let page = Response::new(200, "<html>").with_header("Content-Type", "text/html");
        assert!(page.ok());
        assert_eq!(page.header("content-type"), Some("text/html"));
    }

    #[test]
    fn test_request_cacheable() {
        assert!(Request::get("https://habits.example/").is_cacheable());
        assert!(!Request::get("https://habits.example/")
            .with_method("post")
            .is_cacheable());
        assert!(Request::navigate("https://habits.example/").is_navigation());
    }
}
