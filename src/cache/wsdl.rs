//! File-backed WSDL document cache.
//!
//! One file per target URL, named by a content hash of the URL. The file's
//! modification time is the staleness clock; expiry is checked lazily on
//! read, there is no background sweep.

use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use crate::observability::metrics;

/// Default time-to-live of a cached WSDL document (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

const CACHE_EXTENSION: &str = "wsdl";

/// WSDL cache storage failures.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("could not create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read WSDL cache file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write WSDL cache file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove WSDL cache file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// TTL-bounded store of WSDL documents keyed by target URL.
#[derive(Debug, Clone)]
pub struct WsdlCache {
    dir: PathBuf,
    ttl: Duration,
}

impl WsdlCache {
    /// Open the cache rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>, ttl: Duration) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| CacheError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        tracing::debug!(dir = ?dir, ttl_secs = ttl.as_secs(), "WSDL cache opened");
        Ok(Self { dir, ttl })
    }

    /// Look up the cached document for `url`.
    ///
    /// An entry older than the TTL is deleted and reported as absent.
    pub async fn get(&self, url: &str) -> Result<Option<Bytes>, CacheError> {
        let path = self.path_for(url);
        let read_err = |source| CacheError::Read {
            path: path.clone(),
            source,
        };

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(url = %url, "WSDL cache miss");
                metrics::record_cache_lookup("miss");
                return Ok(None);
            }
            Err(e) => return Err(read_err(e)),
        };

        let modified = metadata.modified().map_err(read_err)?;
        // An mtime in the future counts as fresh.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();

        if age > self.ttl {
            self.remove(&path).await?;
            tracing::debug!(url = %url, age_secs = age.as_secs(), "WSDL cache entry expired");
            metrics::record_cache_lookup("expired");
            return Ok(None);
        }

        match fs::read(&path).await {
            Ok(content) => {
                tracing::debug!(url = %url, "WSDL cache hit");
                metrics::record_cache_lookup("hit");
                Ok(Some(Bytes::from(content)))
            }
            // Removed by a concurrent expiry or clear.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                metrics::record_cache_lookup("miss");
                Ok(None)
            }
            Err(e) => Err(read_err(e)),
        }
    }

    /// Store `content` for `url`, replacing any previous entry.
    ///
    /// Content goes to a temporary file first and is renamed into place, so
    /// a concurrent reader sees either the old entry or the new one.
    pub async fn put(&self, url: &str, content: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(url);
        let tmp_path = self.dir.join(format!(".{}.tmp", Uuid::new_v4().simple()));

        if let Err(source) = fs::write(&tmp_path, content).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(CacheError::Write { path, source });
        }
        if let Err(source) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(CacheError::Write { path, source });
        }

        tracing::debug!(url = %url, bytes = content.len(), "WSDL cached");
        Ok(())
    }

    /// Delete every cached document. Returns how many entries were removed.
    pub async fn clear(&self) -> Result<usize, CacheError> {
        let read_dir_err = |source| CacheError::Read {
            path: self.dir.clone(),
            source,
        };

        let mut entries = fs::read_dir(&self.dir).await.map_err(read_dir_err)?;
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == CACHE_EXTENSION) {
                self.remove(&path).await?;
                removed += 1;
            }
        }

        tracing::debug!(removed, "WSDL cache cleared");
        Ok(removed)
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Directory holding the cache files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let key = Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes());
        self.dir.join(format!("{}.{}", key.simple(), CACHE_EXTENSION))
    }

    async fn remove(&self, path: &Path) -> Result<(), CacheError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Remove {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
