//! Content-addressed summary cache.
//!
//! A summary is keyed by the SHA-256 fingerprint of `(provider, model, prompt, text)`.
//! The filesystem implementation stores one `<fingerprint>.json` file per entry,
//! each holding `{"summary": "..."}`. Entries are never expired by this crate.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Name of the cache directory created inside the output root.
pub const CACHE_DIR_NAME: &str = ".llms-txt-cache";

const FIELD_SEPARATOR: &str = "||";

/// Hex SHA-256 over the fields joined with `||`.
pub fn fingerprint(provider: &str, model: &str, prompt: &str, text: &str) -> String {
    let joined = [provider, model, prompt, text].join(FIELD_SEPARATOR);
    format!("{:x}", Sha256::digest(joined.as_bytes()))
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cache entry {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk representation of one cached summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub summary: String,
}

/// Key-value storage for summaries.
#[async_trait]
pub trait SummaryCache: Send + Sync {
    /// `Ok(None)` on a plain miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn put(&self, key: &str, summary: &str) -> Result<(), CacheError>;
}

/// One JSON file per fingerprint inside a directory.
#[derive(Debug, Clone)]
pub struct FsCache {
    dir: PathBuf,
}

impl FsCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates `<output_root>/.llms-txt-cache` if needed.
    pub async fn in_output_root(output_root: &Path) -> Result<Self, CacheError> {
        let dir = output_root.join(CACHE_DIR_NAME);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| CacheError::Io {
                path: dir.clone(),
                source,
            })?;
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl SummaryCache for FsCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        let entry: CacheEntry = serde_json::from_str(&raw).map_err(|source| CacheError::Json { path, source })?;
        Ok(Some(entry.summary))
    }

    async fn put(&self, key: &str, summary: &str) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        let json = serde_json::to_string(&CacheEntry {
            summary: summary.to_string(),
        })
        .map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;
        // concurrent writers of one key write identical bytes; last one wins
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| CacheError::Io { path, source })
    }
}

/// Process-local cache, mostly useful in tests and for one-shot embedding.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SummaryCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().ok().and_then(|entries| entries.get(key).cloned()))
    }

    async fn put(&self, key: &str, summary: &str) -> Result<(), CacheError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), summary.to_string());
        }
        Ok(())
    }
}
