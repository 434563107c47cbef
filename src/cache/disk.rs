//! On-disk cache storage
//!
//! ```text
//! <root>/
//!   <generation>/
//!     <url>.meta.json     status, status text, headers
//!     <url>.body          raw bytes
//!   .staging-<uuid>/      batch being committed
//!   .retired-<uuid>/      previous generation, parked during a commit
//! ```
//!
//! Names are percent-encoded. The meta file is written last, so an entry
//! without one is ignored.

use super::error::{CacheError, CacheResult};
use super::store::CacheStorage;
use super::types::Response;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const META_SUFFIX: &str = ".meta.json";
const BODY_SUFFIX: &str = ".body";

#[derive(Debug, Serialize, Deserialize)]
struct StoredMeta {
    url: String,
    status: u16,
    #[serde(default)]
    status_text: String,
    #[serde(default)]
    headers: Vec<(String, String)>,
}

/// Cache generations stored as directories under a root
#[derive(Debug, Clone)]
pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    /// Use `root`, creating it if needed
    pub async fn open(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn generation_dir(&self, generation: &str) -> PathBuf {
        self.root.join(urlencoding::encode(generation).as_ref())
    }

    fn entry_paths(dir: &Path, url: &str) -> (PathBuf, PathBuf) {
        let name = urlencoding::encode(url);
        (
            dir.join(format!("{}{}", name, META_SUFFIX)),
            dir.join(format!("{}{}", name, BODY_SUFFIX)),
        )
    }

    async fn write_entry(dir: &Path, url: &str, response: &Response) -> CacheResult<()> {
        let (meta_path, body_path) = Self::entry_paths(dir, url);
        let meta = StoredMeta {
            url: url.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers: response.headers.clone(),
        };

        fs::write(&body_path, &response.body).await?;

        let tmp = meta_path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&meta)?).await?;
        fs::rename(&tmp, &meta_path).await?;
        Ok(())
    }

    async fn copy_entries(from: &Path, to: &Path) -> CacheResult<()> {
        let mut dir = match fs::read_dir(from).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_file() {
                fs::copy(entry.path(), to.join(entry.file_name())).await?;
            }
        }
        Ok(())
    }

    async fn stage(
        &self,
        staging: &Path,
        generation_dir: &Path,
        entries: &[(String, Response)],
    ) -> CacheResult<()> {
        fs::create_dir_all(staging).await?;
        Self::copy_entries(generation_dir, staging).await?;
        for (url, response) in entries {
            Self::write_entry(staging, url, response).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn generations(&self) -> CacheResult<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;

        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let raw = entry.file_name().to_string_lossy().to_string();
            if raw.starts_with('.') {
                continue;
            }
            match urlencoding::decode(&raw) {
                Ok(name) => names.push(name.into_owned()),
                Err(e) => tracing::warn!("Skipping cache directory {}: {}", raw, e),
            }
        }

        names.sort();
        Ok(names)
    }

    async fn lookup(&self, generation: &str, url: &str) -> CacheResult<Option<Response>> {
        let (meta_path, body_path) = Self::entry_paths(&self.generation_dir(generation), url);

        let meta = match fs::read(&meta_path).await {
            Ok(bytes) => serde_json::from_slice::<StoredMeta>(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let body = fs::read(&body_path).await?;

        Ok(Some(Response {
            status: meta.status,
            status_text: meta.status_text,
            headers: meta.headers,
            body,
        }))
    }

    async fn put(&self, generation: &str, url: &str, response: &Response) -> CacheResult<()> {
        let dir = self.generation_dir(generation);
        fs::create_dir_all(&dir).await?;
        Self::write_entry(&dir, url, response).await
    }

    async fn commit(&self, generation: &str, entries: Vec<(String, Response)>) -> CacheResult<()> {
        let target = self.generation_dir(generation);
        let staging = self
            .root
            .join(format!(".staging-{}", uuid::Uuid::new_v4()));

        if let Err(e) = self.stage(&staging, &target, &entries).await {
            if let Err(cleanup) = fs::remove_dir_all(&staging).await {
                tracing::warn!("Failed to remove {}: {}", staging.display(), cleanup);
            }
            return Err(e);
        }

        let retired = self
            .root
            .join(format!(".retired-{}", uuid::Uuid::new_v4()));

        let parked = match swap_in(&staging, &target, &retired).await {
            Ok(parked) => parked,
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&staging).await {
                    tracing::debug!("Failed to remove {}: {}", staging.display(), cleanup);
                }
                return Err(CacheError::Storage(format!(
                    "failed to publish {}: {}",
                    generation, e
                )));
            }
        };

        if parked {
            if let Err(e) = fs::remove_dir_all(&retired).await {
                tracing::warn!("Failed to remove {}: {}", retired.display(), e);
            }
        }

        tracing::debug!(generation, entries = entries.len(), "Committed cache batch");
        Ok(())
    }

    async fn delete(&self, generation: &str) -> CacheResult<bool> {
        match fs::remove_dir_all(self.generation_dir(generation)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn entries(&self, generation: &str) -> CacheResult<Vec<String>> {
        let mut dir = match fs::read_dir(self.generation_dir(generation)).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut urls = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(encoded) = name.strip_suffix(META_SUFFIX) {
                if let Ok(url) = urlencoding::decode(encoded) {
                    urls.push(url.into_owned());
                }
            }
        }

        urls.sort();
        Ok(urls)
    }
}

/// Move `staging` into place at `target`, parking the live generation at
/// `retired` first; returns whether anything was parked
///
/// If the final rename fails the parked generation is moved back.
async fn swap_in(staging: &Path, target: &Path, retired: &Path) -> std::io::Result<bool> {
    let parked = fs::try_exists(target).await?;
    if parked {
        fs::rename(target, retired).await?;
    }

    if let Err(e) = fs::rename(staging, target).await {
        if parked {
            if let Err(restore) = fs::rename(retired, target).await {
                tracing::error!("Failed to restore {}: {}", target.display(), restore);
            }
        }
        return Err(e);
    }
    Ok(parked)
}
