//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

use super::category::{DISTRICT_PLACEHOLDER, OutageCategory, StrategyKind};
use crate::utils::clean_text;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target district settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// HTTP client settings for fetching source pages
    #[serde(default)]
    pub http: HttpConfig,

    /// Notification transport settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Local persistence settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Markup rules per extraction strategy
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Tracked categories, processed in declared order
    #[serde(default = "defaults::categories")]
    pub categories: Vec<OutageCategory>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from process environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Recognized: `OUTAGE_DISTRICT`, `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`,
    /// `REQUEST_TIMEOUT_SECS`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(district) = lookup("OUTAGE_DISTRICT") {
            self.watch.district = district;
        }

        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.notify.telegram_bot_token = Some(token);
        }

        if let Some(chat_id) = lookup("TELEGRAM_CHAT_ID") {
            self.notify.telegram_chat_id = Some(chat_id);
        }

        if let Some(timeout) = lookup("REQUEST_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.http.timeout_secs = secs,
                Err(_) => log::warn!("Ignoring REQUEST_TIMEOUT_SECS={timeout:?}: not a number"),
            }
        }
    }

    /// Validate configuration values for basic sanity.
    ///
    /// Selector syntax is checked separately when the extractor is built.
    pub fn validate(&self) -> Result<()> {
        if self.watch.district.trim().is_empty() {
            return Err(AppError::validation("watch.district is empty"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.categories.is_empty() {
            return Err(AppError::validation("No categories defined"));
        }

        let mut keys = HashSet::new();
        for category in &self.categories {
            let key = category.key.as_str();
            if key.trim().is_empty() {
                return Err(AppError::validation("Category with empty key"));
            }
            if key.contains(['/', '\\']) || key.contains("..") {
                return Err(AppError::validation(format!(
                    "Category key '{key}' must not contain path separators or '..'"
                )));
            }
            if !keys.insert(key) {
                return Err(AppError::validation(format!(
                    "Duplicate category key '{key}'"
                )));
            }
            self.validate_source_url(category)?;
        }
        Ok(())
    }

    /// The category URL must parse once the district is filled in, and a
    /// district-filtered planned page must filter on the target district.
    fn validate_source_url(&self, category: &OutageCategory) -> Result<()> {
        let resolved = category.source_url(&self.watch.district);
        let url = url::Url::parse(&resolved).map_err(|e| {
            AppError::validation(format!(
                "Category '{}' has invalid url '{}': {e}",
                category.key, category.url
            ))
        })?;

        if category.strategy != StrategyKind::Planned {
            return Ok(());
        }
        let district = clean_text(&self.watch.district);
        if let Some((_, filtered)) = url.query_pairs().find(|(name, _)| name == "district") {
            if clean_text(&filtered) != district {
                return Err(AppError::validation(format!(
                    "Category '{}' filters on district '{}' but watch.district is '{}'; \
                     use {} in the url",
                    category.key, filtered, district, DISTRICT_PLACEHOLDER
                )));
            }
        }
        Ok(())
    }

    /// Look up a category by key.
    pub fn category(&self, key: &str) -> Option<&OutageCategory> {
        self.categories.iter().find(|c| c.key == key)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch: WatchConfig::default(),
            http: HttpConfig::default(),
            notify: NotifyConfig::default(),
            storage: StorageConfig::default(),
            extract: ExtractConfig::default(),
            categories: defaults::categories(),
        }
    }
}

/// Target district settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// District name, matched as a prefix of the section title
    #[serde(default = "defaults::district")]
    pub district: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            district: defaults::district(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Accept header sent with page requests
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Accept-Language header sent with page requests
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            accept: defaults::accept(),
            accept_language: defaults::accept_language(),
        }
    }
}

/// Notification settings. Missing credentials disable notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub telegram_bot_token: Option<String>,

    #[serde(default)]
    pub telegram_chat_id: Option<String>,

    /// Bot API base URL
    #[serde(default = "defaults::telegram_api_base")]
    pub telegram_api_base: String,
}

impl NotifyConfig {
    /// Token and chat id, when both are present and non-blank.
    pub fn telegram_credentials(&self) -> Option<(&str, &str)> {
        let token = self.telegram_bot_token.as_deref().map(str::trim)?;
        let chat_id = self.telegram_chat_id.as_deref().map(str::trim)?;
        if token.is_empty() || chat_id.is_empty() {
            return None;
        }
        Some((token, chat_id))
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            telegram_chat_id: None,
            telegram_api_base: defaults::telegram_api_base(),
        }
    }
}

/// Local filesystem persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one state file per category
    #[serde(default = "defaults::storage_dir")]
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: defaults::storage_dir(),
        }
    }
}

/// Markup rules for both extraction strategies.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractConfig {
    #[serde(default)]
    pub emergency: EmergencyRules,

    #[serde(default)]
    pub planned: PlannedRules,
}

/// Cell positions within an outage row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnLayout {
    pub location: usize,
    pub start: usize,
    pub end: usize,
    pub status: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            location: 0,
            start: 1,
            end: 2,
            status: 3,
        }
    }
}

/// Maps a raw status token to a display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusLabel {
    pub raw: String,
    pub label: String,
}

/// Emergency page: one section per district, each with its own table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyRules {
    /// CSS selector for a district section
    #[serde(default = "defaults::emergency_section")]
    pub section_selector: String,

    /// CSS selector for the district name inside a section
    #[serde(default = "defaults::emergency_section_title")]
    pub section_title_selector: String,

    /// CSS selector for outage rows inside a section
    #[serde(default = "defaults::emergency_row")]
    pub row_selector: String,

    /// CSS selector matching a row's direct cells
    #[serde(default = "defaults::cell")]
    pub cell_selector: String,

    /// CSS selector for the nested affected-address list
    #[serde(default = "defaults::addresses")]
    pub addresses_selector: String,

    /// Rows with fewer cells are skipped
    #[serde(default = "defaults::min_cells")]
    pub min_cells: usize,

    #[serde(default)]
    pub columns: ColumnLayout,

    /// Raw status tokens replaced by friendlier labels
    #[serde(default = "defaults::status_labels")]
    pub status_labels: Vec<StatusLabel>,
}

impl Default for EmergencyRules {
    fn default() -> Self {
        Self {
            section_selector: defaults::emergency_section(),
            section_title_selector: defaults::emergency_section_title(),
            row_selector: defaults::emergency_row(),
            cell_selector: defaults::cell(),
            addresses_selector: defaults::addresses(),
            min_cells: defaults::min_cells(),
            columns: ColumnLayout::default(),
            status_labels: defaults::status_labels(),
        }
    }
}

/// Planned page: already filtered to the district, one results table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedRules {
    /// CSS selector for the results table; absent when nothing is planned
    #[serde(default = "defaults::planned_table")]
    pub table_selector: String,

    /// CSS selector for outage rows inside the table
    #[serde(default = "defaults::planned_row")]
    pub row_selector: String,

    /// CSS selector matching a row's direct cells
    #[serde(default = "defaults::cell")]
    pub cell_selector: String,

    /// CSS selector for the nested affected-address list
    #[serde(default = "defaults::addresses")]
    pub addresses_selector: String,

    /// Rows with fewer cells are skipped
    #[serde(default = "defaults::min_cells")]
    pub min_cells: usize,

    #[serde(default)]
    pub columns: ColumnLayout,
}

impl Default for PlannedRules {
    fn default() -> Self {
        Self {
            table_selector: defaults::planned_table(),
            row_selector: defaults::planned_row(),
            cell_selector: defaults::cell(),
            addresses_selector: defaults::addresses(),
            min_cells: defaults::min_cells(),
            columns: ColumnLayout::default(),
        }
    }
}

mod defaults {
    use super::{OutageCategory, StatusLabel, StrategyKind};

    // Watch defaults
    pub fn district() -> String {
        "Central".into()
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; outage-watch/0.1; district outage notifier)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8".into()
    }
    pub fn accept_language() -> String {
        "en;q=0.9,*;q=0.5".into()
    }

    // Notify defaults
    pub fn telegram_api_base() -> String {
        "https://api.telegram.org".into()
    }

    // Storage defaults
    pub fn storage_dir() -> String {
        "storage".into()
    }

    // Extraction defaults
    pub fn emergency_section() -> String {
        "div.district".into()
    }
    pub fn emergency_section_title() -> String {
        "h2".into()
    }
    pub fn emergency_row() -> String {
        "table tr".into()
    }
    pub fn planned_table() -> String {
        "table.results".into()
    }
    pub fn planned_row() -> String {
        "tr".into()
    }
    pub fn cell() -> String {
        "td".into()
    }
    pub fn addresses() -> String {
        ".addresses".into()
    }
    pub fn min_cells() -> usize {
        5
    }
    pub fn status_labels() -> Vec<StatusLabel> {
        vec![StatusLabel {
            raw: "in progress".into(),
            label: "repair crew on site".into(),
        }]
    }

    // Category defaults
    pub fn categories() -> Vec<OutageCategory> {
        vec![
            OutageCategory::new(
                "emergency",
                "https://water.example.org/outages/emergency",
                "Emergency water outages",
                StrategyKind::Emergency,
            ),
            OutageCategory::new(
                "planned",
                "https://water.example.org/outages/planned?district={district}",
                "Planned water outages",
                StrategyKind::Planned,
            ),
        ]
    }
}
