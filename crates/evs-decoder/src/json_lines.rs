//! JSON-lines event exports: one record object per line.
//!
//! This is the shape `evtx_dump -o jsonl` writes, so an exported log searches
//! the same way as the native file. Blank lines are skipped. A line that is
//! not valid JSON is a malformed record, not a failed file.

use evs_core::{DecodeError, DecoderHandle, Record, RecordDecoder};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesDecoder;

struct JsonLinesHandle {
    reader: BufReader<File>,
    line: Vec<u8>,
    exhausted: bool,
}

impl RecordDecoder for JsonLinesDecoder {
    fn open(&self, path: &Path) -> Result<Box<dyn DecoderHandle + '_>, DecodeError> {
        let file = File::open(path).map_err(|err| DecodeError::open(path, err))?;
        let mut reader = BufReader::new(file);

        match first_significant_byte(&mut reader).map_err(|err| DecodeError::open(path, err))? {
            None | Some(b'{') => {}
            Some(_) => {
                return Err(DecodeError::open(path, "not a JSON-lines event export"));
            }
        }
        tracing::trace!(path = %path.display(), "opened json-lines export");

        Ok(Box::new(JsonLinesHandle {
            reader,
            line: Vec::new(),
            exhausted: false,
        }))
    }
}

/// Skip a byte-order mark and leading whitespace, then peek the next byte.
fn first_significant_byte(reader: &mut BufReader<File>) -> io::Result<Option<u8>> {
    if reader.fill_buf()?.starts_with(UTF8_BOM) {
        reader.consume(UTF8_BOM.len());
    }
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(at) => {
                let byte = buf[at];
                reader.consume(at);
                return Ok(Some(byte));
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

impl JsonLinesHandle {
    fn next_record(&mut self) -> Option<Result<Record, DecodeError>> {
        if self.exhausted {
            return None;
        }
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    // A read error leaves the stream position unknown
                    self.exhausted = true;
                    return Some(Err(DecodeError::record(err)));
                }
            }

            let line = self.line.trim_ascii();
            if line.is_empty() {
                continue;
            }
            return Some(
                serde_json::from_slice(line)
                    .map(Record::new)
                    .map_err(DecodeError::record),
            );
        }
    }
}

impl DecoderHandle for JsonLinesHandle {
    fn records(&mut self) -> Box<dyn Iterator<Item = Result<Record, DecodeError>> + '_> {
        Box::new(std::iter::from_fn(move || self.next_record()))
    }
}
