//! Offline App-Shell Cache
//!
//! The installable background worker's logic, independent of any browser:
//!
//! - **controller**: Lifecycle (install/activate) and fetch interception
//! - **manifest**: Generation name and app-shell asset list
//! - **store**: Cache storage trait and in-memory implementation
//! - **disk**: Directory-backed cache storage (native only)
//! - **network**: Live fetch trait and reqwest implementation
//! - **host**: Worker global scope (skip waiting, claim clients)
//! - **types**: Request, response and origin
//! - **error**: Error types
//!
//! # Request handling
//!
//! ```text
//! navigate ──► cached shell ──miss──► live shell ──fail──► 503
//! GET      ──► cache ──miss──► network ──ok, same origin──► store copy
//!                                 └──fail──► 503
//! ```

pub mod controller;
#[cfg(feature = "native")]
pub mod disk;
pub mod error;
pub mod host;
pub mod manifest;
pub mod network;
pub mod store;
pub mod types;

pub use controller::{
    ActivateReport, CacheController, CacheStatus, FetchOutcome, GenerationInfo, InstallReport,
    ResponseSource, WorkerState,
};
#[cfg(feature = "native")]
pub use disk::DiskCacheStorage;
pub use error::{CacheError, CacheResult};
pub use host::{DetachedHost, WorkerHost};
pub use manifest::{AssetManifest, DEFAULT_ASSETS, DEFAULT_GENERATION, SHELL_DOCUMENT};
#[cfg(feature = "native")]
pub use network::HttpNetwork;
pub use network::Network;
pub use store::{CacheStorage, MemoryCacheStorage};
pub use types::{Origin, Request, RequestMode, Response};
