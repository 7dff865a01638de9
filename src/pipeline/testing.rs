//! Test doubles for pipeline collaborators.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{CanonicalReport, PersistedState};
use crate::services::{DocumentFetcher, Notifier};
use crate::storage::ReportStore;

/// Serves canned pages by URL; unknown URLs fail like a refused connection.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: String) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }
}

#[async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "connection refused"))
    }
}

/// In-memory store with switchable failures and call counters.
#[derive(Default)]
pub struct MemoryStore {
    states: Mutex<HashMap<String, PersistedState>>,
    fail_reads: bool,
    fail_writes: bool,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Successful writes only.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<PersistedState>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(AppError::store_read(key, "store unreachable"));
        }
        Ok(self.states.lock().unwrap().get(key).cloned())
    }

    async fn put(
        &self,
        key: &str,
        report: &CanonicalReport,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        if self.fail_writes {
            return Err(AppError::store_write(key, "permission denied"));
        }
        self.states.lock().unwrap().insert(
            key.to_string(),
            PersistedState::new(key, report.clone(), timestamp),
        );
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Records every message; optionally fails every send.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        if self.fail {
            return Err(AppError::notify("transport unavailable"));
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// One planned-works row with the given addresses.
pub fn planned_row(location: &str, addresses: &[&str]) -> String {
    format!(
        r#"<tr><td>{location}</td><td>20.10. 08:00</td><td>20.10. 14:00</td><td>maintenance</td><td><div class="addresses">{}</div></td></tr>"#,
        addresses.join("<br>")
    )
}

/// Planned-works page with a results table of `rows`.
pub fn planned_page(rows: &[String]) -> String {
    format!(
        r#"<html><body><table class="results"><tr><th>Where</th><th>From</th><th>To</th><th>Work</th><th>Streets</th></tr>{}</table></body></html>"#,
        rows.concat()
    )
}

/// Emergency page with one `district` section listing `locations`.
pub fn emergency_page(district: &str, locations: &[&str]) -> String {
    let rows: String = locations
        .iter()
        .map(|location| {
            format!(
                r#"<tr><td>{location}</td><td>19.10. 06:00</td><td></td><td>in progress</td><td><div class="addresses">{location} 1<br>{location} 2</div></td></tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="district"><h2>{district}</h2><table>{rows}</table></div></body></html>"#
    )
}
