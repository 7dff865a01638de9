// src/config.rs

//! Configuration loading utilities.
//!
//! Both entry points resolve configuration the same way: a TOML file (local
//! path or S3 object) when present, defaults otherwise, then environment
//! overrides, then validation.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;
#[cfg(feature = "s3")]
use crate::storage::S3Storage;

/// Load configuration from a local TOML file.
///
/// A missing file falls back to defaults; an unreadable or malformed one is
/// an error.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        log::info!("Loading config from {}", path.display());
        Config::load(path)?
    } else {
        log::warn!("Config file {} not found. Using defaults.", path.display());
        Config::default()
    };
    finish(&mut config)?;
    Ok(config)
}

/// Apply environment overrides and validate.
fn finish(config: &mut Config) -> Result<()> {
    config.apply_env();
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))
}

/// Config loader for Lambda environment.
#[cfg(feature = "s3")]
pub struct LambdaConfigLoader {
    storage: S3Storage,
    key: String,
}

#[cfg(feature = "s3")]
impl LambdaConfigLoader {
    pub fn new(storage: S3Storage, config_key: &str) -> Self {
        Self {
            storage,
            key: config_key.to_string(),
        }
    }

    /// Load config from S3, falling back to defaults when the object is absent.
    pub async fn load_config(&self) -> Result<Config> {
        log::info!("Loading config file from S3: {}", self.key);
        let maybe_bytes = self
            .storage
            .read_bytes_optional(&self.key)
            .await
            .map_err(|e| AppError::config(format!("Config read from S3 failed: {e}")))?;

        let mut config = match maybe_bytes {
            Some(bytes) => {
                let s = String::from_utf8(bytes).map_err(|e| {
                    AppError::config(format!("Config file {} is not valid UTF-8: {}", self.key, e))
                })?;
                Config::from_toml(&s)?
            }
            None => {
                log::warn!("Config file {} not found in S3. Using defaults.", self.key);
                Config::default()
            }
        };
        finish(&mut config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.categories.len(), 2);
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let sample = Config::from_toml(include_str!("../outage-watch.toml")).unwrap();
        let defaults = Config::default();
        assert_eq!(sample.watch.district, defaults.watch.district);
        assert_eq!(sample.categories, defaults.categories);
        assert!(sample.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("outage-watch.toml");
        std::fs::write(&path, "[watch\ndistrict = ").unwrap();
        assert!(matches!(load_config(&path), Err(AppError::Toml(_))));
    }

    #[test]
    fn test_invalid_values_are_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("outage-watch.toml");
        std::fs::write(&path, "[http]\ntimeout_secs = 0\n").unwrap();
        assert!(matches!(load_config(&path), Err(AppError::Config(_))));
    }
}
