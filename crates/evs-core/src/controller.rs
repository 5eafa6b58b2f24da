//! Search controller — single-flight, generation-tagged search orchestration.
//!
//! At most one search is logically active per controller. [`SearchController::search`]
//! cancels whatever is in flight, bumps the generation and starts a fresh
//! worker on the tokio blocking pool. Latest wins; requests are never queued.
//!
//! # Invariants
//!
//! - The controller is the only owner of the current generation, state,
//!   report and index. Workers reach it exclusively through the channel.
//! - Every worker message is tagged with the generation that spawned it.
//!   Messages whose tag differs from the current generation are dropped, so a
//!   superseded search can never overwrite a newer one.
//! - Starting or cancelling a search clears the previous report and index.
//!
//! # Delivery
//!
//! UI loops call [`SearchController::pump`] once per tick; it drains the
//! channel without blocking and forwards current-generation updates to a
//! [`SearchConsumer`]. Async callers use [`SearchController::next_update`].

use crate::error::SearchError;
use crate::index::{build_index, IndexEntry};
use crate::search::SearchEngine;
use crate::types::{Record, SearchProgress, SearchReport, SearchRequest, SearchState};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const CHANNEL_CAPACITY: usize = 64;

/// Monotonically increasing search id. 0 means "no search started yet".
pub type Generation = u64;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum WorkerMessage {
    Started,
    Progress(SearchProgress),
    Finished(Box<SearchReport>),
}

#[derive(Debug)]
struct Tagged {
    generation: Generation,
    message: WorkerMessage,
}

/// A current-generation event, already applied to the controller's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchUpdate {
    Started { generation: Generation },
    Progress { generation: Generation, progress: SearchProgress },
    Finished { generation: Generation, state: SearchState },
}

/// Receives search lifecycle callbacks from [`SearchController::pump`].
///
/// Records are not copied into the consumer; fetch them by ordinal with
/// [`SearchController::record`].
pub trait SearchConsumer {
    fn on_search_started(&mut self, generation: Generation, request: &SearchRequest);

    /// Partial result count after each scanned file.
    fn on_search_progress(&mut self, generation: Generation, progress: SearchProgress);

    /// The search reached a terminal state (`report.state`).
    fn on_search_finished(
        &mut self,
        generation: Generation,
        report: &SearchReport,
        index: &[IndexEntry],
    );
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct SearchController {
    engine: Arc<SearchEngine>,
    runtime: Handle,
    tx: mpsc::Sender<Tagged>,
    rx: mpsc::Receiver<Tagged>,
    generation: Generation,
    cancel: Option<CancellationToken>,
    request: Option<SearchRequest>,
    state: SearchState,
    progress: Option<SearchProgress>,
    report: Option<SearchReport>,
    index: Vec<IndexEntry>,
    stale_dropped: u64,
}

impl SearchController {
    /// `runtime` is where workers are spawned; the controller itself may be
    /// driven from a plain thread.
    pub fn new(engine: Arc<SearchEngine>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            engine,
            runtime,
            tx,
            rx,
            generation: 0,
            cancel: None,
            request: None,
            state: SearchState::Idle,
            progress: None,
            report: None,
            index: Vec::new(),
            stale_dropped: 0,
        }
    }

    /// Start a search, superseding any search in flight.
    pub fn search(&mut self, request: SearchRequest) -> Generation {
        self.discard_current();
        self.generation += 1;
        let generation = self.generation;

        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        self.request = Some(request.clone());
        self.state = SearchState::Running;

        tracing::debug!(
            generation,
            directory = %request.directory.display(),
            event_id = request.criterion.event_id,
            "controller: spawning search"
        );

        let engine = Arc::clone(&self.engine);
        let tx = self.tx.clone();
        self.runtime
            .spawn_blocking(move || run_worker(&engine, request, generation, token, tx));
        generation
    }

    /// Stop the in-flight search (if any) and drop the current results.
    pub fn cancel(&mut self) {
        self.discard_current();
        // Anything still in the channel belongs to a dead generation now
        self.generation += 1;
        self.request = None;
        self.state = SearchState::Idle;
        tracing::debug!(generation = self.generation, "controller: cancelled");
    }

    /// Drain pending worker messages without blocking and forward the
    /// current-generation ones to `consumer`. Returns how many were delivered.
    pub fn pump<C: SearchConsumer + ?Sized>(&mut self, consumer: &mut C) -> usize {
        let mut delivered = 0;
        while let Ok(tagged) = self.rx.try_recv() {
            if let Some(update) = self.apply(tagged) {
                self.dispatch(update, consumer);
                delivered += 1;
            }
        }
        delivered
    }

    /// Wait for the next current-generation update. Stale messages are
    /// dropped while waiting.
    ///
    /// Every search ends in exactly one `Finished` update, also when its
    /// worker panics. The controller owns a sender, so this never yields
    /// `None` while a search is pending.
    pub async fn next_update(&mut self) -> Option<SearchUpdate> {
        loop {
            let tagged = self.rx.recv().await?;
            if let Some(update) = self.apply(tagged) {
                return Some(update);
            }
        }
    }

    /// Wait for the next current-generation update and forward it to
    /// `consumer`. See [`SearchController::next_update`].
    pub async fn deliver_next<C: SearchConsumer + ?Sized>(
        &mut self,
        consumer: &mut C,
    ) -> Option<SearchUpdate> {
        let update = self.next_update().await?;
        self.dispatch(update, consumer);
        Some(update)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn request(&self) -> Option<&SearchRequest> {
        self.request.as_ref()
    }

    pub fn progress(&self) -> Option<SearchProgress> {
        self.progress
    }

    /// The finished report of the current generation.
    pub fn report(&self) -> Option<&SearchReport> {
        self.report.as_ref()
    }

    pub fn index(&self) -> &[IndexEntry] {
        &self.index
    }

    /// Fetch a result by its index ordinal.
    pub fn record(&self, ordinal: usize) -> Option<&Record> {
        self.report.as_ref()?.record(ordinal)
    }

    /// Number of messages discarded because their generation was stale.
    pub fn stale_dropped(&self) -> u64 {
        self.stale_dropped
    }

    fn discard_current(&mut self) {
        if let Some(token) = self.cancel.take() {
            tracing::debug!(generation = self.generation, "controller: cancelling in-flight search");
            token.cancel();
        }
        self.progress = None;
        self.report = None;
        self.index.clear();
    }

    fn apply(&mut self, tagged: Tagged) -> Option<SearchUpdate> {
        let generation = tagged.generation;
        if generation != self.generation {
            self.stale_dropped += 1;
            tracing::debug!(
                stale = generation,
                current = self.generation,
                "controller: dropping stale message"
            );
            return None;
        }

        match tagged.message {
            WorkerMessage::Started => Some(SearchUpdate::Started { generation }),
            WorkerMessage::Progress(progress) => {
                self.progress = Some(progress);
                Some(SearchUpdate::Progress { generation, progress })
            }
            WorkerMessage::Finished(report) => {
                let state = report.state;
                self.index = build_index(&report.records);
                self.report = Some(*report);
                self.state = state;
                self.cancel = None;
                tracing::debug!(generation, %state, results = self.index.len(), "controller: search finished");
                Some(SearchUpdate::Finished { generation, state })
            }
        }
    }

    fn dispatch<C: SearchConsumer + ?Sized>(&self, update: SearchUpdate, consumer: &mut C) {
        match update {
            SearchUpdate::Started { generation } => {
                if let Some(request) = &self.request {
                    consumer.on_search_started(generation, request);
                }
            }
            SearchUpdate::Progress { generation, progress } => {
                consumer.on_search_progress(generation, progress);
            }
            SearchUpdate::Finished { generation, .. } => {
                if let Some(report) = &self.report {
                    consumer.on_search_finished(generation, report, &self.index);
                }
            }
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

fn run_worker(
    engine: &SearchEngine,
    request: SearchRequest,
    generation: Generation,
    cancel: CancellationToken,
    tx: mpsc::Sender<Tagged>,
) {
    let started = Tagged { generation, message: WorkerMessage::Started };
    if tx.blocking_send(started).is_err() {
        return;
    }

    // Progress is advisory; drop it rather than stall the scan on a slow consumer
    let mut on_progress = |progress| {
        let _ = tx.try_send(Tagged { generation, message: WorkerMessage::Progress(progress) });
    };

    // A panicking decoder must still end the generation, or consumers wait forever
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        engine.search_with(&request, &cancel, &mut on_progress)
    }));

    let report = match outcome {
        Ok(Ok(report)) => report,
        Ok(Err(SearchError::Cancelled)) => {
            tracing::debug!(generation, "worker: search cancelled");
            return;
        }
        Ok(Err(err)) => {
            tracing::warn!(generation, error = %err, "worker: search failed");
            SearchReport::failed(request, err.to_string())
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!(generation, %reason, "worker: search panicked");
            SearchReport::failed(request, format!("search worker panicked: {reason}"))
        }
    };

    let finished = Tagged { generation, message: WorkerMessage::Finished(Box::new(report)) };
    if tx.blocking_send(finished).is_err() {
        tracing::debug!(generation, "worker: controller gone, result dropped");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
