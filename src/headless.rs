//! Headless mode — one search, matches on stdout, notices on stderr.

use crate::cli::OutputFormat;
use evs_core::{
    Generation, IndexEntry, Notice, SearchConsumer, SearchController, SearchProgress,
    SearchReport, SearchRequest, SearchState, SearchUpdate, Severity,
};
use std::io::{self, Write};

/// [`SearchConsumer`] that writes results instead of drawing them.
///
/// Write errors (a closed pipe, usually) do not abort the callback chain; the
/// first one is kept and returned by [`HeadlessPrinter::finish`].
pub struct HeadlessPrinter<O: Write, E: Write> {
    out: O,
    err: E,
    format: OutputFormat,
    printed: usize,
    error: Option<io::Error>,
}

impl<O: Write, E: Write> HeadlessPrinter<O, E> {
    pub fn new(out: O, err: E, format: OutputFormat) -> Self {
        Self { out, err, format, printed: 0, error: None }
    }

    /// Number of matches written to `out`.
    pub fn printed(&self) -> usize {
        self.printed
    }

    /// Flush both streams and surface the first write error.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        self.err.flush()
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn keep_error(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }

    fn write_matches(&mut self, report: &SearchReport, index: &[IndexEntry]) -> io::Result<()> {
        for (entry, record) in index.iter().zip(&report.records) {
            match self.format {
                OutputFormat::Jsonl => {
                    serde_json::to_writer(&mut self.out, record.data())?;
                    writeln!(self.out)?;
                }
                OutputFormat::Index => {
                    let file = record
                        .source()
                        .and_then(|path| path.file_name())
                        .map(|name| name.to_string_lossy())
                        .unwrap_or("-".into());
                    writeln!(self.out, "{}\t{}\t{}", entry.ordinal, entry.label, file)?;
                }
            }
            self.printed += 1;
        }
        Ok(())
    }

    fn write_notice(&mut self, notice: &Notice) -> io::Result<()> {
        writeln!(self.err, "{}: {}", severity_prefix(notice.severity()), notice)
    }
}

fn severity_prefix(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

impl<O: Write, E: Write> SearchConsumer for HeadlessPrinter<O, E> {
    fn on_search_started(&mut self, _generation: Generation, request: &SearchRequest) {
        let result = writeln!(
            self.err,
            "Starting search for event {} ...",
            request.criterion
        );
        self.keep_error(result);
    }

    fn on_search_progress(&mut self, _generation: Generation, _progress: SearchProgress) {}

    fn on_search_finished(
        &mut self,
        _generation: Generation,
        report: &SearchReport,
        index: &[IndexEntry],
    ) {
        let result = self.write_matches(report, index);
        self.keep_error(result);

        for notice in report.notices() {
            let result = self.write_notice(&notice);
            self.keep_error(result);
        }
        if report.state != SearchState::Failed && !report.is_empty() {
            let result = writeln!(self.err, "Found {} events.", report.len());
            self.keep_error(result);
        }
    }
}

/// Run `request` through `controller` and print it with `printer`.
/// Returns the terminal state of the search.
pub async fn run<O: Write, E: Write>(
    controller: &mut SearchController,
    request: SearchRequest,
    printer: &mut HeadlessPrinter<O, E>,
) -> anyhow::Result<SearchState> {
    let generation = controller.search(request);
    tracing::debug!(generation, "headless: search submitted");

    while let Some(update) = controller.deliver_next(printer).await {
        if let SearchUpdate::Finished { state, .. } = update {
            printer.finish()?;
            return Ok(state);
        }
    }
    anyhow::bail!("search worker stopped without a result")
}
