//! Shared test utilities for evs integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Fixtures are JSON-lines files in temporary directories,
//! shaped exactly like `evtx_dump -o jsonl` output, so every harness runs
//! without binary `.evtx` samples.

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
