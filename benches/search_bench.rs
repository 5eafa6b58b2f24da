//! Search engine benchmarks.
//!
//! Measures end-to-end engine throughput (directory scan, JSON-lines decode,
//! filter, accumulation) over generated fixtures on disk.
//!
//! # Groups
//!
//! | Group | What it measures |
//! |-------|-----------------|
//! | `hit_rate` | One 20k-record file at 1% and 50% match rates |
//! | `truncation` | Early exit once the limit is reached |
//! | `scaling` | Throughput as the record count grows from 1k to 100k |
//! | `index` | `build_index` over finalized results |
//!
//! # Viewing results
//!
//! ```sh
//! cargo bench --bench search_bench
//! open target/criterion/report/index.html
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use evs_core::{
    build_index, FilePattern, Record, SearchCriterion, SearchEngine, SearchLimit, SearchRequest,
};
use evs_decoder::JsonLinesDecoder;
use serde_json::json;
use std::hint::black_box;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const MATCH: i64 = 4624;
const OTHER: i64 = 4634;

fn event(id: i64, seq: usize) -> serde_json::Value {
    json!({
        "Event": {
            "System": {
                "EventID": id,
                "EventRecordID": seq,
                "Channel": "Security",
                "TimeCreated": { "#attributes": { "SystemTime": "2024-01-15T10:00:00.000000Z" } }
            },
            "EventData": { "TargetUserName": "alice", "LogonType": 3, "IpAddress": "10.0.0.1" }
        }
    })
}

/// One file per `files` with `per_file` records; every `every`-th record matches.
fn fixture(files: usize, per_file: usize, every: usize) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for f in 0..files {
        let file = std::fs::File::create(dir.path().join(format!("log{f:03}.jsonl"))).unwrap();
        let mut out = std::io::BufWriter::new(file);
        for i in 0..per_file {
            let id = if i % every == 0 { MATCH } else { OTHER };
            serde_json::to_writer(&mut out, &event(id, f * per_file + i)).unwrap();
            out.write_all(b"\n").unwrap();
        }
    }
    dir
}

fn engine() -> SearchEngine {
    SearchEngine::new(Arc::new(JsonLinesDecoder), FilePattern::new("*.jsonl").unwrap())
}

fn request(dir: &Path, limit: usize) -> SearchRequest {
    SearchRequest::new(dir, SearchCriterion::new(MATCH), SearchLimit::new(limit).unwrap())
}

// ---------------------------------------------------------------------------
// Hit rate
// ---------------------------------------------------------------------------

fn hit_rate_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_rate");
    group.throughput(Throughput::Elements(20_000));
    let engine = engine();

    for (name, every) in [("1pct", 100), ("50pct", 2)] {
        let dir = fixture(1, 20_000, every);
        group.bench_function(name, |b| {
            b.iter(|| black_box(engine.search(&request(dir.path(), 1_000_000)).unwrap()))
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Truncation
// ---------------------------------------------------------------------------

fn truncation_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("truncation");
    let engine = engine();
    let dir = fixture(4, 5_000, 2);

    for limit in [10usize, 1_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::new("limit", limit), &limit, |b, &limit| {
            b.iter(|| black_box(engine.search(&request(dir.path(), limit)).unwrap()))
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Scaling
// ---------------------------------------------------------------------------

fn scaling_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");
    group.sample_size(20);
    let engine = engine();

    for records in [1_000usize, 10_000, 100_000] {
        let dir = fixture(10, records / 10, 10);
        group.throughput(Throughput::Elements(records as u64));
        group.bench_with_input(BenchmarkId::new("records", records), &records, |b, _| {
            b.iter(|| black_box(engine.search(&request(dir.path(), 1_000_000)).unwrap()))
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

fn index_bench(c: &mut Criterion) {
    let records: Vec<Record> = (0..10_000).map(|i| Record::new(event(MATCH, i))).collect();
    c.bench_function("index/build_10k", |b| b.iter(|| black_box(build_index(&records))));
}

criterion_group!(
    search_benches,
    hit_rate_bench,
    truncation_bench,
    scaling_bench,
    index_bench
);
criterion_main!(search_benches);
