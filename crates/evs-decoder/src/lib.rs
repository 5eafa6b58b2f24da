//! evs-decoder — record decoder adapters for evs.
//!
//! Each adapter implements [`evs_core::RecordDecoder`]: it opens one log file
//! and yields [`evs_core::Record`] values in file order. The engine picks the
//! adapter once per controller via [`decoder_for`].

pub mod evtx_file;
pub mod json_lines;

pub use evtx_file::EvtxDecoder;
pub use json_lines::JsonLinesDecoder;

use evs_core::config::DecoderKind;
use evs_core::RecordDecoder;
use std::sync::Arc;

/// The adapter for a configured [`DecoderKind`].
pub fn decoder_for(kind: DecoderKind) -> Arc<dyn RecordDecoder> {
    match kind {
        DecoderKind::Evtx => Arc::new(EvtxDecoder),
        DecoderKind::JsonLines => Arc::new(JsonLinesDecoder),
    }
}
