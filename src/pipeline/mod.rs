//! Change-detection pipeline.
//!
//! - `canonical`: records → order-independent report text
//! - `detect`: one category's fetch/compare/notify/persist transaction
//! - `runner`: all categories in declared order

pub mod canonical;
pub mod detect;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use canonical::canonicalize;
pub use detect::{ChangeDetector, compose_message};
pub use runner::run_all;

use crate::error::Result;
use crate::models::{Config, RunSummary};
use crate::services::{DocumentFetcher, Extractor, Notifier};
use crate::storage::ReportStore;

/// Run every configured category against the given collaborators.
///
/// Fails only when the extractor cannot be built from configuration; category
/// failures are reported in the summary.
pub async fn run_watch(
    config: &Config,
    fetcher: &dyn DocumentFetcher,
    store: &dyn ReportStore,
    notifier: &dyn Notifier,
) -> Result<RunSummary> {
    let extractor = Extractor::new(&config.watch.district, &config.extract)?;
    let detector = ChangeDetector::new(fetcher, &extractor, store, notifier);
    Ok(run_all(&detector, &config.categories).await)
}
