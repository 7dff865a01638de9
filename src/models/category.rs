//! Outage category definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker in a category URL replaced by the target district.
pub const DISTRICT_PLACEHOLDER: &str = "{district}";

/// Extraction strategy used for a category's source page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Page grouped into per-district sections; end time may be unknown
    Emergency,
    /// Page already filtered to the district; a single results table
    Planned,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Emergency => f.write_str("emergency"),
            StrategyKind::Planned => f.write_str("planned"),
        }
    }
}

/// One independently tracked outage feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutageCategory {
    /// Persistence key and log label (e.g., "emergency")
    pub key: String,

    /// URL of the source page; `{district}` is replaced by the target district
    pub url: String,

    /// Title placed above the report in notifications
    pub header: String,

    /// Extraction strategy for the source page
    pub strategy: StrategyKind,
}

impl OutageCategory {
    pub fn new(
        key: impl Into<String>,
        url: impl Into<String>,
        header: impl Into<String>,
        strategy: StrategyKind,
    ) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            header: header.into(),
            strategy,
        }
    }

    /// Source URL for `district`, with `{district}` filled in query-encoded.
    pub fn source_url(&self, district: &str) -> String {
        if !self.url.contains(DISTRICT_PLACEHOLDER) {
            return self.url.clone();
        }
        let encoded: String = url::form_urlencoded::byte_serialize(district.as_bytes()).collect();
        self.url.replace(DISTRICT_PLACEHOLDER, &encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_deserializes_lowercase() {
        let category: OutageCategory = toml::from_str(
            r#"
            key = "planned"
            url = "https://example.com/planned"
            header = "Planned works"
            strategy = "planned"
            "#,
        )
        .unwrap();
        assert_eq!(category.strategy, StrategyKind::Planned);
        assert_eq!(category.strategy.to_string(), "planned");
    }

    #[test]
    fn test_source_url_fills_district() {
        let category = OutageCategory::new(
            "planned",
            "https://example.com/planned?district={district}",
            "Planned works",
            StrategyKind::Planned,
        );
        assert_eq!(
            category.source_url("Old Town & Quay"),
            "https://example.com/planned?district=Old+Town+%26+Quay"
        );
    }

    #[test]
    fn test_source_url_without_placeholder_is_unchanged() {
        let category = OutageCategory::new(
            "emergency",
            "https://example.com/emergency",
            "Emergency",
            StrategyKind::Emergency,
        );
        assert_eq!(category.source_url("Harbor"), "https://example.com/emergency");
    }
}
