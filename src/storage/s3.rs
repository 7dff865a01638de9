//! AWS S3 storage implementation.
//!
//! State objects live at `{prefix}/state/{key}.json` in the configured bucket.
//! A missing object reads as "never written"; any other failure is an error.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{CanonicalReport, PersistedState};
use crate::storage::{ReportStore, state_key};

/// S3-based report storage.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Create S3 storage from environment configuration.
    ///
    /// - `S3_BUCKET`: bucket name (default: `outage-watch`)
    /// - `S3_PREFIX`: key prefix (default: `outage-watch`)
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let bucket = std::env::var("S3_BUCKET").unwrap_or_else(|_| "outage-watch".to_string());
        let prefix = std::env::var("S3_PREFIX").unwrap_or_else(|_| "outage-watch".to_string());

        Self::new(client, bucket, prefix)
    }

    /// Full object key for a key relative to the prefix.
    fn object_key(&self, key: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", prefix, key)
        }
    }

    /// Read raw bytes, returning None if the object doesn't exist.
    pub async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let object_key = self.object_key(key);
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output.body.collect().await.map_err(|e| {
                    AppError::s3(format!("reading s3://{}/{}: {e}", self.bucket, object_key))
                })?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    log::debug!("No object at s3://{}/{}", self.bucket, object_key);
                    Ok(None)
                } else {
                    Err(AppError::s3(format!(
                        "get s3://{}/{}: {service_err}",
                        self.bucket, object_key
                    )))
                }
            }
        }
    }

    async fn write_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<String> {
        let object_key = self.object_key(key);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(bytes))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| {
                AppError::s3(format!(
                    "put s3://{}/{}: {}",
                    self.bucket,
                    object_key,
                    e.into_service_error()
                ))
            })?;
        Ok(format!("s3://{}/{}", self.bucket, object_key))
    }
}

#[async_trait]
impl ReportStore for S3Storage {
    async fn get(&self, key: &str) -> Result<Option<PersistedState>> {
        let Some(bytes) = self
            .read_bytes_optional(&state_key(key))
            .await
            .map_err(|e| AppError::store_read(key, e))?
        else {
            return Ok(None);
        };

        let state = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::store_read(key, format!("malformed state object: {e}")))?;
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

        let location = self
            .write_bytes(&state_key(key), bytes)
            .await
            .map_err(|e| AppError::store_write(key, e))?;

        log::info!("Stored '{}' report {} at {}", key, state.digest, location);
        Ok(())
    }
}
