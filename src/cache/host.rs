//! Worker host seam: the global scope the worker runs in

use super::error::CacheResult;
use async_trait::async_trait;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait WorkerHost {
    /// Let this worker replace a waiting predecessor right away
    async fn skip_waiting(&self) -> CacheResult<()>;

    /// Take control of pages that are already open
    async fn claim_clients(&self) -> CacheResult<()>;
}

/// Host with no pages attached, used by the command-line front end
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl WorkerHost for DetachedHost {
    async fn skip_waiting(&self) -> CacheResult<()> {
        tracing::debug!("skip_waiting: no waiting worker");
        Ok(())
    }

    async fn claim_clients(&self) -> CacheResult<()> {
        tracing::debug!("claim_clients: no open pages");
        Ok(())
    }
}
