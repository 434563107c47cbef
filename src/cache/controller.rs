//! Asset Cache Controller
//!
//! Worker lifecycle and request interception for the offline app shell.
//!
//! ```text
//! Parsed ─install─► Installing ─ok─► Installed ─activate─► Activating ─► Activated
//!                        │
//!                        └─any asset fails─► Redundant
//! ```

use super::error::{CacheError, CacheResult};
use super::host::WorkerHost;
use super::manifest::AssetManifest;
use super::network::Network;
use super::store::CacheStorage;
use super::types::{Origin, Request, Response};
use futures_util::future::try_join_all;
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Where a fetch response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Cache,
    Network,
    /// Synthetic 503
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: ResponseSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub generation: String,
    pub assets: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivateReport {
    pub generation: String,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationInfo {
    pub name: String,
    pub entries: usize,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub state: WorkerState,
    pub generation: String,
    pub generations: Vec<GenerationInfo>,
}

/// Offline cache controller over pluggable storage, network and host
pub struct CacheController<S, N, H> {
    storage: S,
    network: N,
    host: H,
    manifest: AssetManifest,
    origin: Origin,
    state: Mutex<WorkerState>,
}

impl<S, N, H> CacheController<S, N, H>
where
    S: CacheStorage,
    N: Network,
    H: WorkerHost,
{
    pub fn new(storage: S, network: N, host: H, manifest: AssetManifest, origin: Origin) -> Self {
        Self {
            storage,
            network,
            host,
            manifest,
            origin,
            state: Mutex::new(WorkerState::Parsed),
        }
    }

    pub fn state(&self) -> WorkerState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_state(&self, next: WorkerState) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let from = *state;
        tracing::debug!(from = %from, to = %next, "Worker state change");
        *state = next;
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn generation(&self) -> &str {
        &self.manifest.generation
    }

    /// Populate the current generation with every manifest asset
    ///
    /// All assets are fetched before anything is written. A network error
    /// or non-2xx status on any of them abandons the install, leaves cache
    /// storage untouched and marks the worker redundant.
    pub async fn install(&self) -> CacheResult<InstallReport> {
        let state = self.state();
        if state != WorkerState::Parsed {
            return Err(CacheError::InvalidState {
                action: "install",
                state,
            });
        }
        self.set_state(WorkerState::Installing);

        let urls = self.manifest.resolve(&self.origin);
        tracing::info!(
            generation = self.generation(),
            assets = urls.len(),
            "Installing app shell"
        );

        let entries = match try_join_all(urls.iter().map(|url| self.fetch_asset(url))).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Install abandoned: {}", e);
                self.set_state(WorkerState::Redundant);
                return Err(e);
            }
        };

        let assets = entries.len();
        if let Err(e) = self.storage.commit(self.generation(), entries).await {
            tracing::warn!("Install abandoned, commit failed: {}", e);
            self.set_state(WorkerState::Redundant);
            return Err(e);
        }

        self.set_state(WorkerState::Installed);
        if let Err(e) = self.host.skip_waiting().await {
            tracing::warn!("skip_waiting failed: {}", e);
        }

        tracing::info!(generation = self.generation(), assets, "App shell installed");
        Ok(InstallReport {
            generation: self.generation().to_string(),
            assets,
        })
    }

    async fn fetch_asset(&self, url: &str) -> CacheResult<(String, Response)> {
        let response = self
            .network
            .fetch(&Request::get(url))
            .await
            .map_err(|e| CacheError::InstallFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.ok() {
            return Err(CacheError::InstallFailed {
                url: url.to_string(),
                reason: format!("status {}", response.status),
            });
        }

        Ok((url.to_string(), response))
    }

    /// Delete every generation but the current one, then claim open pages
    ///
    /// Refused while the current generation is absent from cache storage,
    /// so older bundles survive until a replacement is in place.
    pub async fn activate(&self) -> CacheResult<ActivateReport> {
        let previous = self.state();
        if previous == WorkerState::Redundant {
            return Err(CacheError::InvalidState {
                action: "activate",
                state: previous,
            });
        }

        let generation = self.generation();
        if !self.storage.generations().await?.iter().any(|name| name == generation) {
            tracing::warn!(generation, "Activation refused, generation not installed");
            return Err(CacheError::NotInstalled(generation.to_string()));
        }
        self.set_state(WorkerState::Activating);

        let removed = match self.evict_stale().await {
            Ok(removed) => removed,
            Err(e) => {
                self.set_state(previous);
                return Err(e);
            }
        };

        if let Err(e) = self.host.claim_clients().await {
            tracing::warn!("claim_clients failed: {}", e);
        }
        self.set_state(WorkerState::Activated);

        tracing::info!(
            generation = self.generation(),
            removed = removed.len(),
            "Cache controller activated"
        );
        Ok(ActivateReport {
            generation: self.generation().to_string(),
            removed,
        })
    }

    async fn evict_stale(&self) -> CacheResult<Vec<String>> {
        let mut removed = Vec::new();
        for name in self.storage.generations().await? {
            if name != self.generation() && self.storage.delete(&name).await? {
                tracing::debug!(generation = %name, "Deleted stale cache generation");
                removed.push(name);
            }
        }
        Ok(removed)
    }

    /// Answer an intercepted request
    ///
    /// Navigations get the cached shell document (or the live one). Other
    /// GETs are cache-first, and successful same-origin network responses
    /// are copied into the current generation. Anything that can be served
    /// neither way gets a 503.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        if request.is_navigation() {
            let shell = self.manifest.shell_url(&self.origin);
            if let Some(response) = self.cached(&shell).await {
                return Self::outcome(response, ResponseSource::Cache);
            }
            return self.live(&Request::get(shell), false).await;
        }

        if !request.is_cacheable() {
            return self.live(request, false).await;
        }

        if let Some(response) = self.cached(&request.url).await {
            return Self::outcome(response, ResponseSource::Cache);
        }

        self.live(request, self.origin.contains(&request.url)).await
    }

    async fn cached(&self, url: &str) -> Option<Response> {
        match self.storage.lookup(self.generation(), url).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("Cache lookup failed for {}: {}", url, e);
                None
            }
        }
    }

    async fn live(&self, request: &Request, store_copy: bool) -> FetchOutcome {
        match self.network.fetch(request).await {
            Ok(response) => {
                if store_copy && response.ok() {
                    if let Err(e) = self
                        .storage
                        .put(self.generation(), &request.url, &response)
                        .await
                    {
                        tracing::warn!("Failed to cache {}: {}", request.url, e);
                    }
                }
                Self::outcome(response, ResponseSource::Network)
            }
            Err(e) => {
                tracing::debug!("Serving offline response: {}", e);
                Self::outcome(Response::service_unavailable(), ResponseSource::Offline)
            }
        }
    }

    fn outcome(response: Response, source: ResponseSource) -> FetchOutcome {
        FetchOutcome { response, source }
    }

    /// Lifecycle state plus a summary of every stored generation
    pub async fn status(&self) -> CacheResult<CacheStatus> {
        let mut generations = Vec::new();
        for name in self.storage.generations().await? {
            let entries = self.storage.entries(&name).await?.len();
            generations.push(GenerationInfo {
                current: name == self.generation(),
                name,
                entries,
            });
        }

        Ok(CacheStatus {
            state: self.state(),
            generation: self.generation().to_string(),
            generations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryCacheStorage;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    const ORIGIN: &str = "https://habits.example";
    const CHART: &str = "https://cdn.jsdelivr.net/npm/chart.js";

    #[derive(Default)]
    struct StubNetwork {
        responses: HashMap<String, Response>,
        unreachable: Vec<String>,
        offline: AtomicBool,
        calls: Mutex<Vec<String>>,
    }

    impl StubNetwork {
        fn serving(manifest: &AssetManifest, origin: &Origin) -> Self {
            let responses = manifest
                .resolve(origin)
                .into_iter()
                .map(|url| {
                    let body = format!("body of {}", url);
                    (url, Response::new(200, body))
                })
                .collect();
            Self {
                responses,
                ..Default::default()
            }
        }

        fn with(mut self, url: &str, response: Response) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }

        fn unreachable(mut self, url: &str) -> Self {
            self.unreachable.push(url.to_string());
            self
        }

        fn go_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Network for Arc<StubNetwork> {
        async fn fetch(&self, request: &Request) -> CacheResult<Response> {
            self.calls.lock().unwrap().push(request.url.clone());
            if self.offline.load(Ordering::SeqCst) || self.unreachable.contains(&request.url) {
                return Err(CacheError::Network {
                    url: request.url.clone(),
                    reason: "connection refused".to_string(),
                });
            }
            Ok(self
                .responses
                .get(&request.url)
                .cloned()
                .unwrap_or_else(|| Response::new(404, "not found")))
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        skipped: AtomicUsize,
        claimed: AtomicUsize,
    }

    #[async_trait]
    impl WorkerHost for Arc<RecordingHost> {
        async fn skip_waiting(&self) -> CacheResult<()> {
            self.skipped.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn claim_clients(&self) -> CacheResult<()> {
            self.claimed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    type TestController =
        CacheController<MemoryCacheStorage, Arc<StubNetwork>, Arc<RecordingHost>>;

    struct Fixture {
        controller: TestController,
        storage: MemoryCacheStorage,
        network: Arc<StubNetwork>,
        host: Arc<RecordingHost>,
    }

    fn origin() -> Origin {
        Origin::parse(ORIGIN).unwrap()
    }

    fn fixture_with(network: StubNetwork) -> Fixture {
        let storage = MemoryCacheStorage::new();
        let network = Arc::new(network);
        let host = Arc::new(RecordingHost::default());
        let controller = CacheController::new(
            storage.clone(),
            network.clone(),
            host.clone(),
            AssetManifest::default(),
            origin(),
        );
        Fixture {
            controller,
            storage,
            network,
            host,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(StubNetwork::serving(&AssetManifest::default(), &origin()))
    }

    async fn installed() -> Fixture {
        let fx = fixture();
        fx.controller.install().await.unwrap();
        fx
    }

    #[tokio::test]
    async fn test_install_caches_every_asset() {
        let fx = fixture();
        let report = fx.controller.install().await.unwrap();

        let expected = AssetManifest::default().resolve(&origin());
        assert_eq!(report.assets, expected.len());
        assert_eq!(fx.controller.state(), WorkerState::Installed);
        assert_eq!(fx.host.skipped.load(Ordering::SeqCst), 1);

        let mut cached = fx.storage.entries("habit-tracker-cache-v2").await.unwrap();
        let mut expected = expected;
        cached.sort();
        expected.sort();
        assert_eq!(cached, expected);
    }

    #[tokio::test]
    async fn test_install_fails_when_one_asset_unreachable() {
        let network =
            StubNetwork::serving(&AssetManifest::default(), &origin()).unreachable(CHART);
        let fx = fixture_with(network);

        let err = fx.controller.install().await.unwrap_err();
        assert!(matches!(err, CacheError::InstallFailed { ref url, .. } if url == CHART));
        assert_eq!(fx.controller.state(), WorkerState::Redundant);
        assert!(fx.storage.generations().await.unwrap().is_empty());
        assert_eq!(fx.host.skipped.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_install_fails_on_error_status() {
        let network = StubNetwork::serving(&AssetManifest::default(), &origin())
            .with("https://habits.example/manifest.json", Response::new(404, ""));
        let fx = fixture_with(network);

        assert!(fx.controller.install().await.is_err());
        assert!(fx.storage.generations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_only_once() {
        let fx = installed().await;
        assert!(matches!(
            fx.controller.install().await,
            Err(CacheError::InvalidState { action: "install", .. })
        ));
    }

    #[tokio::test]
    async fn test_activate_removes_stale_generations() {
        let fx = installed().await;
        let old = Response::new(200, "old");
        fx.storage.put("habit-tracker-cache-v1", "https://habits.example/", &old).await.unwrap();
        fx.storage.put("something-else", "https://habits.example/", &old).await.unwrap();

        let report = fx.controller.activate().await.unwrap();
        assert_eq!(report.removed, vec!["habit-tracker-cache-v1", "something-else"]);
        assert_eq!(
            fx.storage.generations().await.unwrap(),
            vec!["habit-tracker-cache-v2"]
        );
        assert_eq!(fx.controller.state(), WorkerState::Activated);
        assert_eq!(fx.host.claimed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_activate_refused_when_redundant() {
        let fx = fixture_with(StubNetwork::default().unreachable("https://habits.example/"));
        assert!(fx.controller.install().await.is_err());

        assert!(matches!(
            fx.controller.activate().await,
            Err(CacheError::InvalidState { state: WorkerState::Redundant, .. })
        ));
        assert_eq!(fx.host.claimed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_activate_keeps_old_bundle_until_installed() {
        let fx = fixture();
        fx.network.go_offline();
        let old = Response::new(200, "old shell");
        fx.storage
            .put("habit-tracker-cache-v1", "https://habits.example/index.html", &old)
            .await
            .unwrap();

        assert!(matches!(
            fx.controller.activate().await,
            Err(CacheError::NotInstalled(ref name)) if name == "habit-tracker-cache-v2"
        ));
        assert_eq!(
            fx.storage.generations().await.unwrap(),
            vec!["habit-tracker-cache-v1"]
        );
        assert_eq!(fx.controller.state(), WorkerState::Parsed);
        assert_eq!(fx.host.claimed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_navigation_serves_cached_shell() {
        let fx = installed().await;
        fx.network.go_offline();

        let outcome = fx
            .controller
            .handle_fetch(&Request::navigate("https://habits.example/habits/today"))
            .await;
        assert_eq!(outcome.source, ResponseSource::Cache);
        assert_eq!(
            outcome.response.body,
            b"body of https://habits.example/index.html"
        );
    }

    #[tokio::test]
    async fn test_navigation_falls_back_to_live_shell() {
        let fx = fixture();
        let outcome = fx
            .controller
            .handle_fetch(&Request::navigate("https://habits.example/settings"))
            .await;
        assert_eq!(outcome.source, ResponseSource::Network);
        assert_eq!(fx.network.calls(), vec!["https://habits.example/index.html"]);

        fx.network.go_offline();
        let outcome = fx
            .controller
            .handle_fetch(&Request::navigate("https://habits.example/settings"))
            .await;
        assert_eq!(outcome.source, ResponseSource::Offline);
        assert_eq!(outcome.response.status, 503);
    }

    #[tokio::test]
    async fn test_cache_first_skips_network() {
        let fx = installed().await;
        let calls_after_install = fx.network.calls().len();

        let outcome = fx
            .controller
            .handle_fetch(&Request::get("https://habits.example/css/base.css"))
            .await;
        assert_eq!(outcome.source, ResponseSource::Cache);
        assert_eq!(fx.network.calls().len(), calls_after_install);
    }

    #[tokio::test]
    async fn test_same_origin_success_is_cached() {
        let icon = "https://habits.example/icons/icon-192.png";
        let fx = fixture_with(StubNetwork::default().with(icon, Response::new(200, "png")));

        let first = fx.controller.handle_fetch(&Request::get(icon)).await;
        assert_eq!(first.source, ResponseSource::Network);

        fx.network.go_offline();
        let second = fx.controller.handle_fetch(&Request::get(icon)).await;
        assert_eq!(second.source, ResponseSource::Cache);
        assert_eq!(second.response.body, b"png");
    }

    #[tokio::test]
    async fn test_cross_origin_and_errors_not_cached() {
        let font = "https://fonts.example/inter.woff2";
        let missing = "https://habits.example/missing.js";
        let fx = fixture_with(StubNetwork::default().with(font, Response::new(200, "font")));

        let outcome = fx.controller.handle_fetch(&Request::get(font)).await;
        assert_eq!(outcome.source, ResponseSource::Network);
        let outcome = fx.controller.handle_fetch(&Request::get(missing)).await;
        assert_eq!(outcome.response.status, 404);

        assert!(fx
            .storage
            .entries("habit-tracker-cache-v2")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_offline_miss_is_503() {
        let fx = installed().await;
        fx.network.go_offline();

        let outcome = fx
            .controller
            .handle_fetch(&Request::get("https://habits.example/not-bundled.js"))
            .await;
        assert_eq!(outcome.source, ResponseSource::Offline);
        assert_eq!(outcome.response.status, 503);
        assert_eq!(outcome.response.status_text, "offline");
    }

    #[tokio::test]
    async fn test_non_get_bypasses_cache() {
        let url = "https://habits.example/api";
        let fx = fixture_with(StubNetwork::default().with(url, Response::new(200, "ok")));

        let request = Request::get(url).with_method("POST");
        let outcome = fx.controller.handle_fetch(&request).await;
        assert_eq!(outcome.source, ResponseSource::Network);
        assert!(fx.storage.lookup("habit-tracker-cache-v2", url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_reports_generations() {
        let fx = installed().await;
        fx.storage
            .put("habit-tracker-cache-v1", "https://habits.example/", &Response::new(200, ""))
            .await
            .unwrap();

        let status = fx.controller.status().await.unwrap();
        assert_eq!(status.state, WorkerState::Installed);
        assert_eq!(status.generations.len(), 2);
        let current = status.generations.iter().find(|g| g.current).unwrap();
        assert_eq!(current.name, "habit-tracker-cache-v2");
        assert_eq!(current.entries, AssetManifest::default().resolve(&origin()).len());
    }
}
