// src/utils/log.rs

//! Console output helpers for interactive CLI runs.
//!
//! Operational logging goes through the `log` facade; these helpers only
//! print the human-facing blocks (run header, per-category summary).

use chrono::Local;

use crate::models::RunSummary;

/// Format a console line with a timestamp prefix.
fn format_line(message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] {}", timestamp, message)
}

/// Print a header block.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("{}", format_line(&border));
    println!("{}", format_line(&format!("  {}", title)));
    println!("{}", format_line(&border));
}

/// Print an indented item.
pub fn sub_item(message: &str) {
    println!("{}", format_line(&format!("    {}", message)));
}

/// Lines of the summary block, without timestamps.
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "[SUMMARY] {} categories, {} updated, {} failed",
        summary.len(),
        summary.updated_count(),
        summary.failure_count()
    )];
    for entry in summary.iter() {
        lines.push(format!("    {}: {}", entry.key, entry.outcome));
    }
    lines
}

/// Print the per-category summary of a run.
pub fn summary(summary: &RunSummary) {
    println!();
    for line in summary_lines(summary) {
        println!("{}", format_line(&line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, Outcome};

    #[test]
    fn test_summary_lines() {
        let mut summary = RunSummary::default();
        summary.push("emergency", Outcome::Unchanged);
        summary.push("planned", Outcome::failed(FailureKind::Fetch, "HTTP 503"));

        let lines = summary_lines(&summary);
        assert_eq!(lines[0], "[SUMMARY] 2 categories, 0 updated, 1 failed");
        assert_eq!(lines[1], "    emergency: unchanged");
        assert_eq!(lines[2], "    planned: failed: fetch (HTTP 503)");
    }
}
