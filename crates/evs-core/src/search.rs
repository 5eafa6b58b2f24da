//! Search engine — directory scan, decode, filter and bounded accumulation.
//!
//! # Algorithm
//!
//! 1. List the target directory (non-recursive), keep regular files whose
//!    name matches the [`FilePattern`], sort them by file name.
//! 2. For each file in order, open it with the [`RecordDecoder`] and run every
//!    decoded record through [`filter::matches`].
//! 3. Append matches until the [`SearchLimit`](crate::SearchLimit) is full.
//!    The next match after that stops the whole scan and marks the report
//!    [`SearchState::Truncated`].
//!
//! Unreadable files and malformed records are recorded in the report and
//! skipped. Only a directory that cannot be listed fails the search.
//!
//! # Cancellation
//!
//! The cancellation token is checked before every file and after every
//! decoded record, so a superseded search stops within one record.

use crate::decoder::RecordDecoder;
use crate::error::{ConfigError, DecodeError, SearchError};
use crate::filter;
use crate::types::{FileFailure, SearchProgress, SearchReport, SearchRequest, SearchState};
use globset::{GlobBuilder, GlobMatcher};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// File pattern
// ---------------------------------------------------------------------------

/// Case-insensitive glob matched against bare file names (`*.evtx`).
#[derive(Debug, Clone)]
pub struct FilePattern {
    pattern: String,
    matcher: GlobMatcher,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|source| ConfigError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, file_name: &OsStr) -> bool {
        self.matcher.is_match(Path::new(file_name))
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

enum FileScan {
    Done,
    LimitReached,
}

/// Runs searches. Stateless between calls; one engine serves every search of
/// a controller.
pub struct SearchEngine {
    decoder: Arc<dyn RecordDecoder>,
    pattern: FilePattern,
}

impl SearchEngine {
    pub fn new(decoder: Arc<dyn RecordDecoder>, pattern: FilePattern) -> Self {
        Self { decoder, pattern }
    }

    /// Files in `directory` that match the pattern, sorted by file name.
    pub fn candidate_files(&self, directory: &Path) -> Result<Vec<PathBuf>, SearchError> {
        let list_err = |source: std::io::Error| SearchError::ListDirectory {
            path: directory.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(directory).map_err(list_err)? {
            let path = entry.map_err(list_err)?.path();
            let matched = path
                .file_name()
                .is_some_and(|name| self.pattern.is_match(name));
            // `is_file` follows symlinks, so linked logs are searched too
            if matched && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Run a search to completion on the calling thread.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchReport, SearchError> {
        self.search_with(request, &CancellationToken::new(), &mut |_| {})
    }

    /// Run a search, observing `cancel` and reporting progress after each file.
    pub fn search_with(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
        progress: &mut dyn FnMut(SearchProgress),
    ) -> Result<SearchReport, SearchError> {
        let files = self.candidate_files(&request.directory)?;
        tracing::debug!(
            directory = %request.directory.display(),
            pattern = self.pattern.as_str(),
            candidates = files.len(),
            event_id = request.criterion.event_id,
            limit = request.limit.get(),
            "search: starting"
        );

        let mut report = SearchReport {
            request: request.clone(),
            state: SearchState::Running,
            records: Vec::new(),
            candidates: files.len(),
            files_scanned: 0,
            failures: Vec::new(),
            records_skipped: 0,
            error: None,
        };

        for (done, path) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::debug!(file = %path.display(), "search: cancelled between files");
                return Err(SearchError::Cancelled);
            }

            if let FileScan::LimitReached = self.scan_file(path, cancel, &mut report)? {
                tracing::info!(
                    limit = request.limit.get(),
                    file = %path.display(),
                    "search: limit reached, aborting"
                );
                report.state = SearchState::Truncated;
                return Ok(report);
            }

            progress(SearchProgress {
                files_done: done + 1,
                files_total: files.len(),
                matched: report.records.len(),
            });
        }

        if !files.is_empty() && report.files_scanned == 0 {
            report.state = SearchState::Failed;
            report.error = Some(format!(
                "none of the {} candidate files could be read",
                files.len()
            ));
        } else {
            report.state = SearchState::Completed;
        }

        tracing::debug!(
            state = %report.state,
            matched = report.records.len(),
            skipped_files = report.failures.len(),
            skipped_records = report.records_skipped,
            "search: finished"
        );
        Ok(report)
    }

    fn scan_file(
        &self,
        path: &Path,
        cancel: &CancellationToken,
        report: &mut SearchReport,
    ) -> Result<FileScan, SearchError> {
        let mut handle = match self.decoder.open(path) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "search: skipping unreadable file");
                report.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    reason: failure_reason(err),
                });
                return Ok(FileScan::Done);
            }
        };
        report.files_scanned += 1;

        let source: Arc<Path> = Arc::from(path);
        let criterion = report.request.criterion;
        let limit = report.request.limit.get();

        for item in handle.records() {
            if cancel.is_cancelled() {
                tracing::debug!(file = %path.display(), "search: cancelled mid-file");
                return Err(SearchError::Cancelled);
            }

            let record = match item {
                Ok(record) => record,
                Err(err) => {
                    tracing::debug!(file = %path.display(), error = %err, "search: skipping record");
                    report.records_skipped += 1;
                    continue;
                }
            };

            if !filter::matches(&record, &criterion) {
                continue;
            }
            if report.records.len() >= limit {
                return Ok(FileScan::LimitReached);
            }
            report.records.push(record.with_source(Arc::clone(&source)));
        }

        Ok(FileScan::Done)
    }
}

fn failure_reason(err: DecodeError) -> String {
    match err {
        DecodeError::Open { reason, .. } => reason,
        DecodeError::Record(reason) => reason,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
