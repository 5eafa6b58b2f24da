//! evs — Event Viewer Search
//!
//! Terminal TUI and headless CLI for searching Windows event logs by event
//! ID. The binary wires the layers together; this crate exposes the pieces
//! that live in the binary so integration tests can import them directly.
//!
//! # Architecture
//!
//! ```text
//! CLI ──► Config ──► SearchController ──► TUI (evs-tui)
//!                          │
//!                          └──────────► headless printer
//! ```
//!
//! Searches run on the tokio blocking pool. The TUI drives the main thread;
//! headless mode awaits the controller on the runtime.

pub mod cli;
pub mod headless;
