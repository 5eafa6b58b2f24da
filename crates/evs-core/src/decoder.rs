//! Record decoder seam.
//!
//! The engine never parses log files itself. It asks a [`RecordDecoder`] to
//! open each candidate file and iterates the handle's records. Adapters live
//! in the `evs-decoder` crate.

use crate::error::DecodeError;
use crate::types::Record;
use std::path::Path;

/// Opens log files. Shared between the controller and its worker threads.
pub trait RecordDecoder: Send + Sync {
    /// Open `path`. Fails with [`DecodeError::Open`] when the file is not a
    /// readable log container.
    fn open(&self, path: &Path) -> Result<Box<dyn DecoderHandle + '_>, DecodeError>;
}

/// An open log file.
pub trait DecoderHandle {
    /// Records in file order. An `Err` item is one malformed record
    /// ([`DecodeError::Record`]); iteration continues after it.
    fn records(&mut self) -> Box<dyn Iterator<Item = Result<Record, DecodeError>> + '_>;
}
