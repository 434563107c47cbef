//! App-shell manifest

use super::types::Origin;
use serde::{Deserialize, Serialize};

/// Current cache generation tag
pub const DEFAULT_GENERATION: &str = "habit-tracker-cache-v2";

/// Document served for every navigation
pub const SHELL_DOCUMENT: &str = "/index.html";

/// Assets cached at install: same-origin files then pinned CDN libraries
pub const DEFAULT_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/css/base.css",
    "/css/light.css",
    "/css/dark.css",
    "/habitual_ui.js",
    "/habitual_ui_bg.wasm",
    "/manifest.json",
    "https://cdn.jsdelivr.net/npm/chart.js",
    "https://cdn.jsdelivr.net/npm/canvas-confetti@1.5.1/dist/confetti.browser.min.js",
];

/// Generation name plus the assets that make up the offline bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub generation: String,
    pub shell: String,
    pub assets: Vec<String>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            generation: DEFAULT_GENERATION.to_string(),
            shell: SHELL_DOCUMENT.to_string(),
            assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AssetManifest {
    pub fn with_generation(mut self, generation: impl Into<String>) -> Self {
        self.generation = generation.into();
        self
    }

    /// Absolute asset URLs, duplicates removed, declaration order kept
    pub fn resolve(&self, origin: &Origin) -> Vec<String> {
        let mut urls: Vec<String> = Vec::with_capacity(self.assets.len());
        for asset in &self.assets {
            let url = origin.resolve(asset);
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }

    pub fn shell_url(&self, origin: &Origin) -> String {
        origin.resolve(&self.shell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = AssetManifest::default();
        assert_eq!(manifest.generation, "habit-tracker-cache-v2");
        assert!(manifest.assets.contains(&manifest.shell));
        assert_eq!(
            manifest
                .assets
                .iter()
                .filter(|a| a.starts_with("https://"))
                .count(),
            2
        );
    }

    #[test]
    fn test_resolve_against_origin() {
        let origin = Origin::parse("https://habits.example").unwrap();
        let manifest = AssetManifest {
            generation: "g".to_string(),
            shell: "/index.html".to_string(),
            assets: vec![
                "/index.html".to_string(),
                "https://habits.example/index.html".to_string(),
                "https://cdn.example/lib.js".to_string(),
            ],
        };

        assert_eq!(
            manifest.resolve(&origin),
            vec![
                "https://habits.example/index.html".to_string(),
                "https://cdn.example/lib.js".to_string(),
            ]
        );
        assert_eq!(
            manifest.shell_url(&origin),
            "https://habits.example/index.html"
        );
    }
}
