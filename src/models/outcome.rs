//! Per-category run outcomes and the run summary.

use std::fmt;

use serde::Serialize;

/// Pipeline step a category run failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    DocumentParse,
    StoreRead,
    StoreWrite,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Fetch => "fetch",
            FailureKind::DocumentParse => "document parse",
            FailureKind::StoreRead => "store read",
            FailureKind::StoreWrite => "store write",
        };
        f.write_str(name)
    }
}

/// Details of a failed category run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    /// A notification went out before the failure (store write only)
    pub notified: bool,
}

/// Result of one category run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// District has no current entries
    NoData,
    /// Current report equals the persisted one
    Unchanged,
    /// New report persisted; `notified` is false when delivery failed
    Updated { notified: bool },
    Failed(Failure),
}

impl Outcome {
    pub(crate) fn failed(kind: FailureKind, message: impl fmt::Display) -> Self {
        Outcome::Failed(Failure {
            kind,
            message: message.to_string(),
            notified: false,
        })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Whether the run changed what subscribers have seen.
    pub fn is_updated(&self) -> bool {
        match self {
            Outcome::Updated { .. } => true,
            Outcome::Failed(failure) => failure.notified,
            _ => false,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoData => f.write_str("no data"),
            Outcome::Unchanged => f.write_str("unchanged"),
            Outcome::Updated { notified: true } => f.write_str("updated"),
            Outcome::Updated { notified: false } => f.write_str("updated (notify failed)"),
            Outcome::Failed(failure) if failure.notified => {
                write!(f, "failed after notify: {} ({})", failure.kind, failure.message)
            }
            Outcome::Failed(failure) => write!(f, "failed: {} ({})", failure.kind, failure.message),
        }
    }
}

/// Outcome of one category, keyed for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOutcome {
    pub key: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Outcomes of a full run, in the order categories were processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RunSummary {
    outcomes: Vec<CategoryOutcome>,
}

impl RunSummary {
    pub fn push(&mut self, key: impl Into<String>, outcome: Outcome) {
        self.outcomes.push(CategoryOutcome {
            key: key.into(),
            outcome,
        });
    }

    pub fn get(&self, key: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryOutcome> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|e| e.outcome.is_failed()).count()
    }

    pub fn updated_count(&self) -> usize {
        self.outcomes.iter().filter(|e| e.outcome.is_updated()).count()
    }

    /// One-line summary, e.g. `emergency: updated; planned: no data`.
    pub fn summary_line(&self) -> String {
        if self.outcomes.is_empty() {
            return "no categories configured".to_string();
        }
        self.outcomes
            .iter()
            .map(|entry| format!("{}: {}", entry.key, entry.outcome))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
