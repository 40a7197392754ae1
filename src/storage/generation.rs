//! Whole-response cache tier, organized as named generations.
//!
//! A generation is a directory of stored responses under the cache root.
//! Exactly one generation is current; the activate sweep deletes the rest.
//! Each entry is a pair of files named by the SHA-256 digest of the URL:
//! `<digest>.meta.json` (status + content type) and `<digest>.body` (raw bytes).

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};

use crate::storage::StorageError;

/// A whole HTTP response as held by the cache tier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// On-disk metadata sidecar for a stored response.
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    status: u16,
    content_type: Option<String>,
}

/// The response cache for one generation, rooted at `<root>/<generation>/`.
pub struct GenerationCache {
    root: PathBuf,
    current: String,
}

impl GenerationCache {
    /// Open the cache, creating the current generation's directory.
    pub async fn open(root: &Path, current: &str) -> Result<Self, StorageError> {
        let cache = Self {
            root: root.to_path_buf(),
            current: current.to_string(),
        };
        fs::create_dir_all(cache.generation_dir()).await?;
        Ok(cache)
    }

    /// Name of the current generation.
    pub fn current(&self) -> &str {
        &self.current
    }

    fn generation_dir(&self) -> PathBuf {
        self.root.join(&self.current)
    }

    fn entry_paths(&self, url: &str) -> (PathBuf, PathBuf) {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        let dir = self.generation_dir();
        (
            dir.join(format!("{digest}.meta.json")),
            dir.join(format!("{digest}.body")),
        )
    }

    /// Exact-match lookup of a stored response by URL.
    ///
    /// `Ok(None)` means a clean miss; `Err` means the tier itself failed.
    pub async fn lookup(&self, url: &str) -> Result<Option<StoredResponse>, StorageError> {
        let (meta_path, body_path) = self.entry_paths(url);

        let meta_bytes = match fs::read(&meta_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let meta: EntryMeta = serde_json::from_slice(&meta_bytes)?;
        let body = fs::read(&body_path).await?;

        debug!(url, size = body.len(), "Response cache hit");

        Ok(Some(StoredResponse {
            status: meta.status,
            content_type: meta.content_type,
            body: Bytes::from(body),
        }))
    }

    /// Store a response under its URL in the current generation.
    ///
    /// The body lands first and the metadata sidecar last, so a torn write
    /// reads as a miss rather than a corrupt entry.
    pub async fn put(&self, url: &str, response: &StoredResponse) -> Result<(), StorageError> {
        let (meta_path, body_path) = self.entry_paths(url);

        let meta = EntryMeta {
            status: response.status,
            content_type: response.content_type.clone(),
        };

        fs::write(&body_path, &response.body).await?;
        fs::write(&meta_path, serde_json::to_vec(&meta)?).await?;

        debug!(url, size = response.body.len(), generation = %self.current, "Stored response");

        Ok(())
    }

    /// List all generation names under the cache root.
    pub async fn generations(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.metadata().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Delete every generation whose name is not the current one.
    ///
    /// Returns the names of the generations removed.
    pub async fn sweep(&self) -> Result<Vec<String>, StorageError> {
        let mut removed = Vec::new();
        for name in self.generations().await? {
            if name != self.current {
                fs::remove_dir_all(self.root.join(&name)).await?;
                info!(generation = %name, "Old generation removed");
                removed.push(name);
            }
        }
        Ok(removed)
    }
}
