//! Ingest benchmark: parsing an event log written through `EventLog`.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fraud_drift::config::default_features;
use fraud_drift::events::{EventIngester, EventLog, InferenceEvent};
use tempfile::tempdir;

fn bench_read_all(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("predictions.json");
    let log = EventLog::open(&path).unwrap();
    let features = default_features();
    for i in 0..1000 {
        let ev = InferenceEvent::new(
            features
                .iter()
                .enumerate()
                .map(|(k, f)| (f.clone(), (i + k) as f64 * 0.01)),
        )
        .with_prediction((i % 2) as u8, 0.5);
        log.append(&ev).unwrap();
    }
    let ingester = EventIngester::new(features);

    c.bench_function("ingest_read_all_1000_records", |b| {
        b.iter(|| black_box(ingester.read_all(&path)).unwrap())
    });
}

criterion_group!(benches, bench_read_all);
criterion_main!(benches);
