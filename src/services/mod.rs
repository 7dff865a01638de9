//! Service layer for the outage watcher.
//!
//! This module contains the collaborators of the change-detection pipeline:
//! - Outage extraction from source pages (`Extractor`)
//! - Source page retrieval (`DocumentFetcher`)
//! - Notification transports (`Notifier`)

mod extractor;
mod fetcher;
pub mod notifier;

pub use extractor::{EmergencyStrategy, ExtractStrategy, Extractor, PlannedStrategy};
pub use fetcher::{DocumentFetcher, HttpFetcher};
pub use notifier::{DisabledNotifier, Notifier, TelegramNotifier};
