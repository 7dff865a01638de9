// src/pipeline/canonical.rs

//! Canonical report rendering.
//!
//! A canonical report depends only on record content: addresses are sorted
//! inside each record and rendered records are sorted before joining, so the
//! same outages always produce byte-identical text whatever their order on
//! the source page.

use crate::models::{CanonicalReport, OutageRecord};
use crate::utils::escape_html;

/// Separator between rendered records.
const RECORD_SEPARATOR: &str = "\n\n";

/// Bullet prefix for affected addresses.
const BULLET: &str = "• ";

/// Render and order `records` into a canonical report.
///
/// Empty input yields the empty report.
pub fn canonicalize(records: &[OutageRecord]) -> CanonicalReport {
    let mut rendered: Vec<String> = records.iter().map(render_record).collect();
    sort_rendered(&mut rendered);
    CanonicalReport::new(rendered.join(RECORD_SEPARATOR))
}

/// Order rendered records lexicographically by bytes.
pub fn sort_rendered(rendered: &mut [String]) {
    rendered.sort_unstable();
}

/// Time range phrase for a record.
pub fn time_phrase(record: &OutageRecord) -> String {
    match &record.end {
        Some(end) => format!("from {} to {}", record.start, end),
        None => format!("from {}, resolution time unknown", record.start),
    }
}

/// Render one record: bold location, time range, status, address bullets.
pub fn render_record(record: &OutageRecord) -> String {
    let mut out = format!(
        "<b>{}</b> ({})",
        escape_html(&record.location),
        escape_html(&time_phrase(record))
    );

    if !record.status.is_empty() {
        out.push_str(" - ");
        out.push_str(&escape_html(&record.status));
    }

    let mut addresses: Vec<&str> = record.addresses.iter().map(String::as_str).collect();
    addresses.sort_unstable();
    for address in addresses {
        out.push('\n');
        out.push_str(BULLET);
        out.push_str(&escape_html(address));
    }
    out
}
