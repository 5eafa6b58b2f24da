//! evs-core — Event Viewer Search core library.
//!
//! This crate holds the search pipeline and the types shared by the decoder
//! adapters and every consumer (TUI, headless).
//!
//! # Architecture
//!
//! ```text
//! Consumer ──► Controller ──► worker: Engine ──► Decoder (per file)
//!    ▲                                  │
//!    │                                  ├──► Filter
//!    └──── pump() ◄── tagged msgs ◄─────┴──► Index builder
//! ```
//!
//! The engine runs on the tokio blocking pool. The controller is the only
//! owner of the current generation and its results; workers talk to it through
//! a bounded `tokio` channel and never touch consumer-visible state.

pub mod config;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod index;
pub mod search;
pub mod types;

pub use controller::{Generation, SearchConsumer, SearchController, SearchUpdate};
pub use decoder::{DecoderHandle, RecordDecoder};
pub use error::{ConfigError, DecodeError, SearchError};
pub use index::{build_index, IndexEntry};
pub use search::{FilePattern, SearchEngine};
pub use types::{
    FileFailure, Notice, Record, SearchCriterion, SearchLimit, SearchProgress, SearchReport,
    SearchRequest, SearchState, Severity,
};
