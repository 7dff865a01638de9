//! Storage abstractions for per-category report state.
//!
//! Each category key maps to one [`PersistedState`] holding the last notified
//! report. Writes overwrite; nothing is ever deleted.
//!
//! ## Layout
//!
//! ```text
//! storage/                  # local dir, or s3://{bucket}/{prefix}/
//! └── state/
//!     ├── emergency.json
//!     └── planned.json
//! ```

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{CanonicalReport, PersistedState};

// Re-export for convenience
pub use local::LocalStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

/// Relative key of the state object for a category.
pub fn state_key(category_key: &str) -> String {
    format!("state/{}.json", category_key)
}

/// Key-value store for the last known report per category.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Last persisted state, or `None` if the key was never written.
    ///
    /// Unreachable storage or a malformed item is an error, never `None`.
    async fn get(&self, key: &str) -> Result<Option<PersistedState>>;

    /// Overwrite the state for `key`.
    async fn put(
        &self,
        key: &str,
        report: &CanonicalReport,
        timestamp: DateTime<Utc>,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key() {
        assert_eq!(state_key("planned"), "state/planned.json");
    }
}
