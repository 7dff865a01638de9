//! Outage record data structure.

use serde::{Deserialize, Serialize};

/// One announced outage, as read from a source row.
///
/// Records have no identity beyond their rendered content: two records are
/// the same outage iff they canonicalize to the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutageRecord {
    /// Street or area label from the first cell
    pub location: String,

    /// Start indicator as shown on the page
    pub start: String,

    /// End indicator; `None` when the resolution time is unknown
    pub end: Option<String>,

    /// Category-dependent status text (may be empty)
    pub status: String,

    /// Affected sub-addresses in document order
    pub addresses: Vec<String>,
}
