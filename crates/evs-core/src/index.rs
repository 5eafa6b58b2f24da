//! Result index — the (ordinal, timestamp) summary a consumer navigates by.

use crate::types::Record;
use chrono::DateTime;

/// Label used when a record carries no readable `TimeCreated`.
pub const UNKNOWN_TIME: &str = "unknown time";

/// One navigable entry per search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Position of the record in the search result.
    pub ordinal: usize,
    /// The record's `TimeCreated` as written in the log, or [`UNKNOWN_TIME`].
    pub label: String,
}

impl IndexEntry {
    /// Label re-rendered with a `chrono` format string. Labels that are not
    /// RFC 3339 timestamps (including the placeholder) are returned unchanged.
    pub fn display_label(&self, format: &str) -> String {
        match DateTime::parse_from_rfc3339(&self.label) {
            Ok(ts) => ts.format(format).to_string(),
            Err(_) => self.label.clone(),
        }
    }
}

/// Build the index for a finalized result set.
///
/// Never fails: `index.len() == records.len()` and `index[i].ordinal == i`.
pub fn build_index(records: &[Record]) -> Vec<IndexEntry> {
    records
        .iter()
        .enumerate()
        .map(|(ordinal, record)| IndexEntry {
            ordinal,
            label: record.time_created().unwrap_or(UNKNOWN_TIME).to_string(),
        })
        .collect()
}
