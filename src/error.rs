// src/error.rs

//! Unified error handling for the outage watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Source document could not be retrieved
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Source document is not usable as structured markup
    #[error("Document parse error: {0}")]
    DocumentParse(String),

    /// Previous report could not be read
    #[error("Store read error for '{key}': {message}")]
    StoreRead { key: String, message: String },

    /// Current report could not be persisted
    #[error("Store write error for '{key}': {message}")]
    StoreWrite { key: String, message: String },

    /// Notification transport failed
    #[error("Notify error: {0}")]
    Notify(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// AWS S3 request failed
    #[error("S3 error: {0}")]
    S3(String),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error for a source URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a document parse error.
    pub fn document_parse(message: impl Into<String>) -> Self {
        Self::DocumentParse(message.into())
    }

    /// Create a store read error for a category key.
    pub fn store_read(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::StoreRead {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a store write error for a category key.
    pub fn store_write(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::StoreWrite {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a notification error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    /// Create an S3 error.
    pub fn s3(message: impl fmt::Display) -> Self {
        Self::S3(message.to_string())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
