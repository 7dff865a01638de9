// src/pipeline/detect.rs

//! Per-category change detection.
//!
//! One run moves a single category through
//! fetch → extract → canonicalize → read previous → compare → notify → persist,
//! stopping at the first step that settles the outcome. Every error is turned
//! into an [`Outcome`]; nothing propagates past the category.

use chrono::Utc;

use crate::models::{CanonicalReport, Failure, FailureKind, OutageCategory, Outcome};
use crate::pipeline::canonical::canonicalize;
use crate::services::{DocumentFetcher, Extractor, Notifier};
use crate::storage::ReportStore;
use crate::utils::escape_html;

/// Drives one category's read-compare-write transaction.
pub struct ChangeDetector<'a> {
    fetcher: &'a dyn DocumentFetcher,
    extractor: &'a Extractor,
    store: &'a dyn ReportStore,
    notifier: &'a dyn Notifier,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(
        fetcher: &'a dyn DocumentFetcher,
        extractor: &'a Extractor,
        store: &'a dyn ReportStore,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            notifier,
        }
    }

    /// Run the full sequence for `category`.
    pub async fn run(&self, category: &OutageCategory) -> Outcome {
        let key = category.key.as_str();

        let url = category.source_url(self.extractor.district());
        let document = match self.fetcher.fetch(&url).await {
            Ok(document) => document,
            Err(e) => {
                log::error!("[{key}] Fetch failed: {e}");
                return Outcome::failed(FailureKind::Fetch, e);
            }
        };

        let records = match self.extractor.extract(&document, category.strategy) {
            Ok(records) => records,
            Err(e) => {
                log::error!("[{key}] Extraction failed: {e}");
                return Outcome::failed(FailureKind::DocumentParse, e);
            }
        };

        let current = canonicalize(&records);
        if current.is_empty() {
            log::info!(
                "[{key}] No outages listed for '{}'",
                self.extractor.district()
            );
            return Outcome::NoData;
        }

        let previous = match self.store.get(key).await {
            Ok(previous) => previous,
            Err(e) => {
                log::error!("[{key}] Could not read previous report: {e}");
                return Outcome::failed(FailureKind::StoreRead, e);
            }
        };

        if previous.as_ref().is_some_and(|state| state.report == current) {
            log::info!("[{key}] Unchanged ({})", current.digest());
            return Outcome::Unchanged;
        }

        log::info!(
            "[{key}] Report changed: {} -> {} ({} record(s))",
            previous
                .as_ref()
                .map_or_else(|| "none".to_string(), |state| state.digest.clone()),
            current.digest(),
            records.len()
        );

        let message = compose_message(category, &current);
        let notified = match self.notifier.notify(&message).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[{key}] Notification failed, persisting anyway: {e}");
                false
            }
        };

        if let Err(e) = self.store.put(key, &current, Utc::now()).await {
            log::error!("[{key}] Could not persist report: {e}");
            return Outcome::Failed(Failure {
                kind: FailureKind::StoreWrite,
                message: e.to_string(),
                notified,
            });
        }

        Outcome::Updated { notified }
    }
}

/// Notification text: bold category header, blank line, report body.
pub fn compose_message(category: &OutageCategory, report: &CanonicalReport) -> String {
    format!("<b>{}</b>\n\n{}", escape_html(&category.header), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractConfig, StrategyKind};
    use crate::pipeline::testing::{
        FakeFetcher, MemoryStore, RecordingNotifier, emergency_page, planned_page, planned_row,
    };

    const EMERGENCY_URL: &str = "https://water.test/emergency";
    const PLANNED_URL: &str = "https://water.test/planned";

    fn emergency() -> OutageCategory {
        OutageCategory::new(
            "emergency",
            EMERGENCY_URL,
            "Emergency outages",
            StrategyKind::Emergency,
        )
    }

    fn planned() -> OutageCategory {
        OutageCategory::new("planned", PLANNED_URL, "Planned works", StrategyKind::Planned)
    }

    fn extractor() -> Extractor {
        Extractor::new("Central", &ExtractConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_first_run_notifies_and_persists() {
        let fetcher = FakeFetcher::new().page(
            PLANNED_URL,
            planned_page(&[planned_row("Pine Rd", &["Pine Rd 3", "Pine Rd 1"])]),
        );
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let extractor = extractor();
        let detector = ChangeDetector::new(&fetcher, &extractor, &store, &notifier);

        let outcome = detector.run(&planned()).await;

        assert_eq!(outcome, Outcome::Updated { notified: true });
        let sent = notifier.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("<b>Planned works</b>\n\n<b>Pine Rd</b>"));
        assert!(sent[0].contains("• Pine Rd 1\n• Pine Rd 3"));

        let stored = store.get("planned").await.unwrap().unwrap();
        assert_eq!(format!("<b>Planned works</b>\n\n{}", stored.report), sent[0]);
    }

    #[tokio::test]
    async fn test_second_identical_run_is_unchanged() {
        let fetcher = FakeFetcher::new().page(
            PLANNED_URL,
            planned_page(&[
                planned_row("Pine Rd", &["Pine Rd 1"]),
                planned_row("Birch Ln", &[]),
            ]),
        );
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let extractor = extractor();
        let detector = ChangeDetector::new(&fetcher, &extractor, &store, &notifier);

        assert!(detector.run(&planned()).await.is_updated());
        assert_eq!(detector.run(&planned()).await, Outcome::Unchanged);
        assert_eq!(notifier.messages().len(), 1);
        assert_eq!(store.put_count(), 1);
    }

    #[tokio::test]
    async fn test_row_order_does_not_matter() {
        let rows = [
            planned_row("Pine Rd", &["B", "A"]),
            planned_row("Birch Ln", &["D", "C"]),
        ];
        let reversed = [
            planned_row("Birch Ln", &["C", "D"]),
            planned_row("Pine Rd", &["A", "B"]),
        ];

        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let extractor = extractor();

        let first = FakeFetcher::new().page(PLANNED_URL, planned_page(&rows));
        let detector = ChangeDetector::new(&first, &extractor, &store, &notifier);
        assert!(detector.run(&planned()).await.is_updated());

        let second = FakeFetcher::new().page(PLANNED_URL, planned_page(&reversed));
        let detector = ChangeDetector::new(&second, &extractor, &store, &notifier);
        assert_eq!(detector.run(&planned()).await, Outcome::Unchanged);
    }

    #[tokio::test]
    async fn test_empty_district_is_no_data_without_write() {
        let fetcher = FakeFetcher::new().page(EMERGENCY_URL, emergency_page("Harbor", &["Dock Rd"]));
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let extractor = extractor();
        let detector = ChangeDetector::new(&fetcher, &extractor, &store, &notifier);

        assert_eq!(detector.run(&emergency()).await, Outcome::NoData);
        assert_eq!(store.put_count(), 0);
        assert_eq!(store.get_count(), 0);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_touches_nothing() {
        let fetcher = FakeFetcher::new();
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let extractor = extractor();
        let detector = ChangeDetector::new(&fetcher, &extractor, &store, &notifier);

        let outcome = detector.run(&planned()).await;

        assert!(matches!(
            outcome,
            Outcome::Failed(Failure { kind: FailureKind::Fetch, notified: false, .. })
        ));
        assert_eq!(store.get_count(), 0);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_document_fails() {
        let fetcher = FakeFetcher::new().page(PLANNED_URL, "Bad Gateway".to_string());
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let extractor = extractor();
        let detector = ChangeDetector::new(&fetcher, &extractor, &store, &notifier);

        let outcome = detector.run(&planned()).await;
        assert!(matches!(
            outcome,
            Outcome::Failed(Failure { kind: FailureKind::DocumentParse, .. })
        ));
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_store_read_failure_suppresses_notify() {
        let fetcher = FakeFetcher::new().page(PLANNED_URL, planned_page(&[planned_row("Pine Rd", &[])]));
        let store = MemoryStore::default().failing_reads();
        let notifier = RecordingNotifier::default();
        let extractor = extractor();
        let detector = ChangeDetector::new(&fetcher, &extractor, &store, &notifier);

        let outcome = detector.run(&planned()).await;

        assert!(matches!(
            outcome,
            Outcome::Failed(Failure { kind: FailureKind::StoreRead, .. })
        ));
        assert!(notifier.messages().is_empty());
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_notify_failure_still_persists() {
        let fetcher = FakeFetcher::new().page(PLANNED_URL, planned_page(&[planned_row("Pine Rd", &["A"])]));
        let store = MemoryStore::default();
        let failing = RecordingNotifier::failing();
        let extractor = extractor();

        let detector = ChangeDetector::new(&fetcher, &extractor, &store, &failing);
        assert_eq!(
            detector.run(&planned()).await,
            Outcome::Updated { notified: false }
        );
        assert_eq!(store.put_count(), 1);

        let notifier = RecordingNotifier::default();
        let detector = ChangeDetector::new(&fetcher, &extractor, &store, &notifier);
        assert_eq!(detector.run(&planned()).await, Outcome::Unchanged);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_store_write_failure_after_notify() {
        let fetcher = FakeFetcher::new().page(PLANNED_URL, planned_page(&[planned_row("Pine Rd", &["A"])]));
        let store = MemoryStore::default().failing_writes();
        let notifier = RecordingNotifier::default();
        let extractor = extractor();
        let detector = ChangeDetector::new(&fetcher, &extractor, &store, &notifier);

        let outcome = detector.run(&planned()).await;

        assert!(matches!(
            outcome,
            Outcome::Failed(Failure { kind: FailureKind::StoreWrite, notified: true, .. })
        ));
        assert!(outcome.is_updated());
        assert_eq!(notifier.messages().len(), 1);

        // Nothing persisted, so the next run reports the same change again.
        assert!(detector.run(&planned()).await.is_updated());
        assert_eq!(notifier.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_changed_report_notifies_again() {
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let extractor = extractor();

        let before = FakeFetcher::new().page(EMERGENCY_URL, emergency_page("Central", &["Main St"]));
        let detector = ChangeDetector::new(&before, &extractor, &store, &notifier);
        assert!(detector.run(&emergency()).await.is_updated());

        let after = FakeFetcher::new().page(
            EMERGENCY_URL,
            emergency_page("Central", &["Main St", "Oak Ave"]),
        );
        let detector = ChangeDetector::new(&after, &extractor, &store, &notifier);
        assert_eq!(
            detector.run(&emergency()).await,
            Outcome::Updated { notified: true }
        );

        let sent = notifier.messages();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].contains("<b>Oak Ave</b>"));
        assert!(sent[1].contains("resolution time unknown"));
    }

    #[tokio::test]
    async fn test_planned_url_follows_target_district() {
        let fetcher = FakeFetcher::new().page(
            "https://water.test/planned?district=Old+Town",
            planned_page(&[planned_row("Quay Rd", &["Quay Rd 2"])]),
        );
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let extractor = Extractor::new("Old Town", &ExtractConfig::default()).unwrap();
        let detector = ChangeDetector::new(&fetcher, &extractor, &store, &notifier);

        let mut category = planned();
        category.url = "https://water.test/planned?district={district}".into();

        assert_eq!(
            detector.run(&category).await,
            Outcome::Updated { notified: true }
        );
    }

    #[test]
    fn test_compose_message_escapes_header() {
        let mut category = planned();
        category.header = "Works & repairs".into();
        let message = compose_message(&category, &CanonicalReport::new("body"));
        assert_eq!(message, "<b>Works &amp; repairs</b>\n\nbody");
    }
}
