//! Canonical reports and their persisted form.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::short_digest;

/// Deterministic text summary of every current outage in one category.
///
/// The empty report is the "nothing to report" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalReport(String);

impl CanonicalReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short hex digest, used for logs and inspection only.
    pub fn digest(&self) -> String {
        short_digest(&self.0)
    }
}

impl fmt::Display for CanonicalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last notified report for one category key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Category key this state belongs to
    pub key: String,

    /// Report body exactly as it was notified
    pub report: CanonicalReport,

    /// Digest of `report`
    pub digest: String,

    /// When the report was persisted
    pub updated_at: DateTime<Utc>,
}

impl PersistedState {
    pub fn new(key: impl Into<String>, report: CanonicalReport, updated_at: DateTime<Utc>) -> Self {
        let digest = report.digest();
        Self {
            key: key.into(),
            report,
            digest,
            updated_at,
        }
    }
}
