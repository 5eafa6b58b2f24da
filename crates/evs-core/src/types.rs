//! Core types for evs-core — Event Viewer Search.
//!
//! This module defines the data structures shared across the pipeline: the
//! decoded [`Record`], the search inputs ([`SearchCriterion`], [`SearchLimit`],
//! [`SearchRequest`]) and the search outputs ([`SearchReport`], [`SearchState`],
//! [`Notice`]).

use serde_json::Value;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Default result cap when neither the config file nor the CLI sets one.
pub const DEFAULT_LIMIT: usize = 1000;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One decoded event-log record.
///
/// The payload is a semi-structured tree (strings, numbers, mappings,
/// sequences) in decode order. Accessors never fail: a field that is missing
/// or has an unexpected shape comes back as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    data: Value,
    /// File the record was decoded from. Shared by every record of a file.
    source: Option<Arc<Path>>,
}

impl Record {
    pub fn new(data: Value) -> Self {
        Self { data, source: None }
    }

    pub fn with_source(mut self, source: Arc<Path>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Walk nested mappings by key. Returns `None` as soon as a segment is
    /// missing or the current node is not a mapping.
    pub fn field(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.data, |node, key| node.as_object()?.get(*key))
    }

    /// `Event.System.EventID` as an integer.
    ///
    /// Accepts a bare number, a numeric string, or an element object whose
    /// `#text` member holds the number (the shape produced when the element
    /// carries a `Qualifiers` attribute).
    pub fn event_id(&self) -> Option<i64> {
        let raw = self.field(&["Event", "System", "EventID"])?;
        let raw = match raw {
            Value::Object(map) => map.get("#text")?,
            other => other,
        };
        match raw {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// `Event.System.TimeCreated` `SystemTime` attribute, as written in the log.
    pub fn time_created(&self) -> Option<&str> {
        self.field(&["Event", "System", "TimeCreated", "#attributes", "SystemTime"])
            .or_else(|| self.field(&["Event", "System", "TimeCreated_attributes", "SystemTime"]))
            .and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Search inputs
// ---------------------------------------------------------------------------

/// The event identifier a search matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchCriterion {
    pub event_id: i64,
}

impl SearchCriterion {
    pub fn new(event_id: i64) -> Self {
        Self { event_id }
    }
}

impl FromStr for SearchCriterion {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self::new)
    }
}

impl fmt::Display for SearchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event_id)
    }
}

/// Maximum number of matches a search accumulates. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchLimit(NonZeroUsize);

impl SearchLimit {
    /// Returns `None` for 0; a zero cap is rejected rather than given meaning.
    pub fn new(limit: usize) -> Option<Self> {
        NonZeroUsize::new(limit).map(Self)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for SearchLimit {
    fn default() -> Self {
        Self(NonZeroUsize::new(DEFAULT_LIMIT).unwrap_or(NonZeroUsize::MIN))
    }
}

impl fmt::Display for SearchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a single search invocation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub directory: PathBuf,
    pub criterion: SearchCriterion,
    pub limit: SearchLimit,
}

impl SearchRequest {
    pub fn new(directory: impl Into<PathBuf>, criterion: SearchCriterion, limit: SearchLimit) -> Self {
        Self {
            directory: directory.into(),
            criterion,
            limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Search outputs
// ---------------------------------------------------------------------------

/// Lifecycle of one search invocation.
///
/// `Idle → Running → {Completed, Truncated, Failed}`. A state is never reused;
/// a new search starts again from `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchState {
    Idle,
    Running,
    /// Every candidate file was processed without reaching the limit.
    Completed,
    /// The limit was reached and the scan stopped early.
    Truncated,
    /// The directory could not be listed, or no candidate file could be read.
    Failed,
}

impl SearchState {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Truncated | Self::Failed)
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchState::Idle => write!(f, "idle"),
            SearchState::Running => write!(f, "running"),
            SearchState::Completed => write!(f, "completed"),
            SearchState::Truncated => write!(f, "truncated"),
            SearchState::Failed => write!(f, "failed"),
        }
    }
}

/// Snapshot emitted by the engine after each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchProgress {
    pub files_done: usize,
    pub files_total: usize,
    pub matched: usize,
}

/// A candidate file that could not be opened by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// The finalized outcome of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub request: SearchRequest,
    pub state: SearchState,
    /// Matches in file-then-record order. Never longer than `request.limit`.
    pub records: Vec<Record>,
    /// Number of files in the directory that matched the file pattern.
    pub candidates: usize,
    /// Number of candidate files that were opened and read.
    pub files_scanned: usize,
    pub failures: Vec<FileFailure>,
    /// Individual records the decoder could not parse.
    pub records_skipped: usize,
    /// Set when the whole search failed.
    pub error: Option<String>,
}

impl SearchReport {
    /// A report for a search that could not run at all.
    pub fn failed(request: SearchRequest, error: impl Into<String>) -> Self {
        Self {
            request,
            state: SearchState::Failed,
            records: Vec::new(),
            candidates: 0,
            files_scanned: 0,
            failures: Vec::new(),
            records_skipped: 0,
            error: Some(error.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `ordinal`, as listed in the result index.
    pub fn record(&self, ordinal: usize) -> Option<&Record> {
        self.records.get(ordinal)
    }

    /// User-facing notices, most severe first.
    ///
    /// Truncation, "no files" and "no matches" each get their own notice so an
    /// empty result is never indistinguishable from a search that did not run.
    pub fn notices(&self) -> Vec<Notice> {
        let mut out = Vec::new();

        if let Some(reason) = &self.error {
            out.push(Notice::Failed { reason: reason.clone() });
        }
        out.extend(self.failures.iter().map(|f| Notice::FileSkipped {
            path: f.path.clone(),
            reason: f.reason.clone(),
        }));
        if self.records_skipped > 0 {
            out.push(Notice::RecordsSkipped { count: self.records_skipped });
        }

        match self.state {
            SearchState::Truncated => out.push(Notice::LimitReached { limit: self.request.limit }),
            SearchState::Completed if self.candidates == 0 => out.push(Notice::NoFilesFound {
                directory: self.request.directory.clone(),
            }),
            SearchState::Completed if self.records.is_empty() => out.push(Notice::NoMatches {
                criterion: self.request.criterion,
            }),
            _ => {}
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// How loudly a consumer should surface a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A distinguishable, user-visible outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The directory held no file matching the pattern. Not an error.
    NoFilesFound { directory: PathBuf },
    /// Files were scanned but no record matched.
    NoMatches { criterion: SearchCriterion },
    /// The result cap was reached; the result is truncated.
    LimitReached { limit: SearchLimit },
    /// A file could not be opened and was skipped.
    FileSkipped { path: PathBuf, reason: String },
    /// Malformed records were skipped.
    RecordsSkipped { count: usize },
    /// The search as a whole failed.
    Failed { reason: String },
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::NoFilesFound { .. } => Severity::Info,
            Notice::NoMatches { .. }
            | Notice::LimitReached { .. }
            | Notice::FileSkipped { .. }
            | Notice::RecordsSkipped { .. } => Severity::Warning,
            Notice::Failed { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoFilesFound { directory } => {
                write!(f, "No log files found in {}", directory.display())
            }
            Notice::NoMatches { .. } => write!(f, "No events found."),
            Notice::LimitReached { limit } => {
                write!(f, "Limit of {limit} events reached, aborting search ...")
            }
            Notice::FileSkipped { path, reason } => {
                write!(f, "Skipped {}: {reason}", path.display())
            }
            Notice::RecordsSkipped { count } => write!(f, "Skipped {count} malformed record(s)"),
            Notice::Failed { reason } => write!(f, "Search failed: {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn logon(event_id: Value) -> Record {
        Record::new(json!({
            "Event": {
                "System": {
                    "EventID": event_id,
                    "TimeCreated": { "#attributes": { "SystemTime": "2024-01-15T10:00:00.000000Z" } }
                }
            }
        }))
    }

    #[test]
    fn event_id_bare_number() {
        assert_eq!(logon(json!(4624)).event_id(), Some(4624));
    }

    #[test]
    fn event_id_with_qualifiers() {
        let record = logon(json!({ "#attributes": { "Qualifiers": 16384 }, "#text": 7036 }));
        assert_eq!(record.event_id(), Some(7036));
    }

    #[test]
    fn event_id_numeric_string() {
        assert_eq!(logon(json!(" 4625 ")).event_id(), Some(4625));
    }

    #[test]
    fn event_id_wrong_shape_is_none() {
        assert_eq!(logon(json!([4624])).event_id(), None);
        assert_eq!(logon(json!("logon")).event_id(), None);
        assert_eq!(Record::new(json!({ "Event": "flat" })).event_id(), None);
        assert_eq!(Record::new(json!(null)).event_id(), None);
    }

    #[test]
    fn time_created_both_attribute_layouts() {
        assert_eq!(
            logon(json!(1)).time_created(),
            Some("2024-01-15T10:00:00.000000Z")
        );
        let separated = Record::new(json!({
            "Event": { "System": { "TimeCreated_attributes": { "SystemTime": "2024-02-01T00:00:00Z" } } }
        }));
        assert_eq!(separated.time_created(), Some("2024-02-01T00:00:00Z"));
    }

    #[test]
    fn limit_zero_is_rejected() {
        assert_eq!(SearchLimit::new(0), None);
        assert_eq!(SearchLimit::new(5).map(SearchLimit::get), Some(5));
        assert_eq!(SearchLimit::default().get(), DEFAULT_LIMIT);
    }

    #[test]
    fn criterion_parses_trimmed_integers() {
        assert_eq!("  4624 ".parse::<SearchCriterion>(), Ok(SearchCriterion::new(4624)));
        assert!("46x".parse::<SearchCriterion>().is_err());
        assert!("".parse::<SearchCriterion>().is_err());
    }

    fn report(state: SearchState, candidates: usize, records: usize) -> SearchReport {
        SearchReport {
            request: SearchRequest::new("/logs", SearchCriterion::new(4624), SearchLimit::default()),
            state,
            records: (0..records).map(|_| logon(json!(4624))).collect(),
            candidates,
            files_scanned: candidates,
            failures: Vec::new(),
            records_skipped: 0,
            error: None,
        }
    }

    #[test]
    fn notices_distinguish_empty_outcomes() {
        assert_eq!(
            report(SearchState::Completed, 0, 0).notices(),
            vec![Notice::NoFilesFound { directory: PathBuf::from("/logs") }]
        );
        assert_eq!(
            report(SearchState::Completed, 2, 0).notices(),
            vec![Notice::NoMatches { criterion: SearchCriterion::new(4624) }]
        );
        assert!(report(SearchState::Completed, 2, 3).notices().is_empty());
    }

    #[test]
    fn truncated_report_has_limit_notice() {
        let notices = report(SearchState::Truncated, 1, 3).notices();
        assert_eq!(notices, vec![Notice::LimitReached { limit: SearchLimit::default() }]);
        assert_eq!(
            notices[0].to_string(),
            "Limit of 1000 events reached, aborting search ..."
        );
        assert_eq!(notices[0].severity(), Severity::Warning);
    }

    #[test]
    fn failed_report_leads_with_error() {
        let request = SearchRequest::new("/nope", SearchCriterion::new(1), SearchLimit::default());
        let notices = SearchReport::failed(request, "boom").notices();
        assert_eq!(notices, vec![Notice::Failed { reason: "boom".into() }]);
        assert_eq!(notices[0].severity(), Severity::Error);
    }
}
