//! On-disk fixtures: temporary directories of JSON-lines event logs.

use evs_core::{FilePattern, SearchEngine};
use evs_decoder::JsonLinesDecoder;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A temporary log directory. Dropped with the test.
pub struct LogDir {
    dir: TempDir,
}

impl LogDir {
    pub fn new() -> Self {
        Self { dir: tempfile::tempdir().expect("create temp dir") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `events` as a `.jsonl` file, one record per line.
    pub fn jsonl(self, name: &str, events: &[Value]) -> Self {
        let mut body = String::new();
        for event in events {
            body.push_str(&event.to_string());
            body.push('\n');
        }
        self.raw(name, body.as_bytes())
    }

    /// Write arbitrary bytes, e.g. a corrupt log or an unrelated file.
    pub fn raw(self, name: &str, bytes: &[u8]) -> Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture subdir");
        }
        std::fs::write(path, bytes).expect("write fixture");
        self
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for LogDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Size of one evtx chunk.
pub const EVTX_CHUNK_SIZE: usize = 0x10000;

/// A bare evtx file header (format 3.1, 4 KiB header block) with no chunks:
/// the smallest file the evtx parser accepts.
pub fn evtx_header() -> Vec<u8> {
    let mut header = vec![0u8; 4096];
    header[..8].copy_from_slice(b"ElfFile\0");
    header[32..36].copy_from_slice(&128u32.to_le_bytes());
    header[36..38].copy_from_slice(&1u16.to_le_bytes());
    header[38..40].copy_from_slice(&3u16.to_le_bytes());
    header[40..42].copy_from_slice(&4096u16.to_le_bytes());
    header
}

/// A valid header followed by one chunk of noise.
pub fn evtx_with_corrupt_chunk() -> Vec<u8> {
    let mut bytes = evtx_header();
    bytes.resize(bytes.len() + EVTX_CHUNK_SIZE, 0xAA);
    bytes
}

/// Engine reading `*.jsonl` files.
pub fn jsonl_engine() -> SearchEngine {
    jsonl_engine_with("*.jsonl")
}

pub fn jsonl_engine_with(pattern: &str) -> SearchEngine {
    SearchEngine::new(
        Arc::new(JsonLinesDecoder),
        FilePattern::new(pattern).expect("valid glob"),
    )
}
