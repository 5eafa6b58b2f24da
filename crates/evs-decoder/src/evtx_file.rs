//! Native `.evtx` files, decoded with the `evtx` crate.
//!
//! Records come out as the JSON tree `evtx` builds from the binary XML:
//! attributes live under `#attributes`, element text under `#text`.

use ::evtx::{EvtxParser, SerializedEvtxRecord};
use evs_core::{DecodeError, DecoderHandle, Record, RecordDecoder};
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct EvtxDecoder;

struct EvtxHandle {
    parser: EvtxParser<File>,
}

impl RecordDecoder for EvtxDecoder {
    fn open(&self, path: &Path) -> Result<Box<dyn DecoderHandle + '_>, DecodeError> {
        // Reads and validates the file header up front
        let parser = EvtxParser::from_path(path).map_err(|err| DecodeError::open(path, err))?;
        tracing::trace!(path = %path.display(), "opened evtx file");
        Ok(Box::new(EvtxHandle { parser }))
    }
}

impl DecoderHandle for EvtxHandle {
    fn records(&mut self) -> Box<dyn Iterator<Item = Result<Record, DecodeError>> + '_> {
        Box::new(self.parser.records_json_value().map(to_record))
    }
}

/// A failed chunk or record surfaces as one [`DecodeError::Record`]; the
/// parser moves on to the next chunk.
fn to_record(item: ::evtx::err::Result<SerializedEvtxRecord<serde_json::Value>>) -> Result<Record, DecodeError> {
    match item {
        Ok(serialized) => Ok(Record::new(serialized.data)),
        Err(err) => Err(DecodeError::record(err)),
    }
}
