// src/pipeline/runner.rs

//! Runs every configured category in declared order.

use crate::models::{OutageCategory, RunSummary};
use crate::pipeline::detect::ChangeDetector;

/// Run `categories` one after another.
///
/// Categories are independent: a failed category is recorded and the next
/// one still runs. The returned summary keeps the declared order.
pub async fn run_all(detector: &ChangeDetector<'_>, categories: &[OutageCategory]) -> RunSummary {
    let mut summary = RunSummary::default();

    for (i, category) in categories.iter().enumerate() {
        log::info!(
            "[{}/{}] Checking '{}' ({})",
            i + 1,
            categories.len(),
            category.key,
            category.url
        );
        let outcome = detector.run(category).await;
        log::info!("[{}] Outcome: {}", category.key, outcome);
        summary.push(category.key.clone(), outcome);
    }

    log::info!(
        "Run complete: {} updated, {} failed of {} categories",
        summary.updated_count(),
        summary.failure_count(),
        summary.len()
    );
    summary
}
