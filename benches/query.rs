//! Benchmarks for normalization and query execution.
//!
//! Benchmark targets:
//! - Normalizing a 1k-event dump: <50ms
//! - Simple filtered query over 1k records: <10ms
//! - Grouped query over 1k records: <10ms
//! - Predicate compilation: <100us

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Value, json};

use eventsift::services::query::CompiledPredicate;
use eventsift::{Dataset, QueryInterpreter, RawDataset, normalize};

const EVENTS: usize = 1_000;

/// Builds a synthetic dump with namespaced keys and mixed statuses.
fn synthetic_raw(events: usize) -> RawDataset {
    let names = ["Schedule", "Purchase", "Lead", "Refund"];
    let mut map = serde_json::Map::new();
    for i in 0..events {
        let root = 100_000 + (i % 7);
        map.insert(
            format!("evt-{i}"),
            json!({
                "date": "2024-03-01T10:00:00",
                "status": if i % 3 == 0 { "failed" } else { "success" },
                "object_id": root,
                "object_title": names[i % names.len()],
                format!("output__{root}__event_name"): names[i % names.len()],
                format!("output__{root}__isfire"): if i % 2 == 0 { "yes" } else { "no" },
                format!("output__{root}__primary_email"): format!("user{i}@example.com"),
                format!("output__{root}__querystring___fbc"): format!("fb.1.{i}"),
                format!("input__{root}__lead__contact__name"): format!("user {i}"),
            }),
        );
    }
    serde_json::from_value(Value::Object(map)).unwrap()
}

fn synthetic_dataset(events: usize) -> Dataset {
    normalize(&synthetic_raw(events))
}

fn bench_normalize(c: &mut Criterion) {
    let raw = synthetic_raw(EVENTS);
    let mut group = c.benchmark_group("normalize");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(EVENTS as u64));
    group.bench_function("1k_events", |b| {
        b.iter(|| normalize(black_box(&raw)));
    });
    group.finish();
}

fn bench_query_execution(c: &mut Criterion) {
    let dataset = synthetic_dataset(EVENTS);
    let interpreter = QueryInterpreter::default();
    let mut group = c.benchmark_group("query_execution");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(EVENTS as u64));

    group.bench_function("filtered", |b| {
        b.iter(|| {
            interpreter
                .execute(
                    black_box(&dataset),
                    black_box(r#"where event_name == "Schedule" and isfire == true"#),
                )
                .unwrap()
        });
    });

    group.bench_function("grouped", |b| {
        b.iter(|| {
            interpreter
                .execute(
                    black_box(&dataset),
                    black_box(r#"where status == "failed" | count by event_name"#),
                )
                .unwrap()
        });
    });

    group.bench_function("select_all_windowed", |b| {
        b.iter(|| {
            interpreter
                .execute(black_box(&dataset), black_box("select * | limit 50 | offset 100"))
                .unwrap()
        });
    });

    group.finish();
}

fn bench_predicate_compile(c: &mut Criterion) {
    let dataset = synthetic_dataset(50);
    let mut group = c.benchmark_group("predicate_compile");

    group.bench_function("equality_chain", |b| {
        b.iter(|| {
            CompiledPredicate::compile(
                black_box(r#"event_name == "Schedule" and isfire == true and status == "failed""#),
                black_box(&dataset),
            )
        });
    });

    group.bench_function("membership", |b| {
        b.iter(|| {
            CompiledPredicate::compile(
                black_box(r#"event_name in ("Schedule", "Purchase", "Lead")"#),
                black_box(&dataset),
            )
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_query_execution,
    bench_predicate_compile
);
criterion_main!(benches);
