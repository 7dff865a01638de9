//! Local filesystem storage implementation.
//!
//! Stores one JSON file per category under `{root}/state/`. Writes go to a
//! temp file first and are renamed into place, so a crash never leaves a
//! half-written state file behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CanonicalReport, PersistedState};
use crate::storage::{ReportStore, state_key};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> std::io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ReportStore for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<PersistedState>> {
        let file_key = state_key(key);
        let Some(bytes) = self
            .read_bytes(&file_key)
            .await
            .map_err(|e| AppError::store_read(key, e))?
        else {
            log::debug!("No state stored for '{}'", key);
            return Ok(None);
        };

        let state = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::store_read(key, format!("malformed {file_key}: {e}")))?;
        Ok(Some(state))
    }

    async fn put(
        &self,
        key: &str,
        report: &CanonicalReport,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let state = PersistedState::new(key, report.clone(), timestamp);
        let bytes = serde_json::to_vec_pretty(&state).map_err(|e| AppError::store_write(key, e))?;

        let file_key = state_key(key);
        self.write_bytes(&file_key, &bytes)
            .await
            .map_err(|e| AppError::store_write(key, e))?;

        log::info!(
            "Stored '{}' report {} at {}",
            key,
            state.digest,
            self.path(&file_key).display()
        );
        Ok(())
    }
}
