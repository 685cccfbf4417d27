//! Criterion benchmarks for fanlog

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use fanlog::handlers::{NullHandler, SamplingHandler, SamplingStrategy};
use fanlog::prelude::*;
use fanlog::{interpolate, Level};
use serde_json::{json, Map};

// ============================================================================
// Interpolation Benchmarks
// ============================================================================

fn bench_interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolation");
    group.throughput(Throughput::Elements(1));

    let mut lookup = Map::new();
    lookup.insert("user".to_string(), json!("alice"));
    lookup.insert("order".to_string(), json!(991));
    lookup.insert("items".to_string(), json!([1, 2, 3]));

    group.bench_function("no_placeholders", |b| {
        b.iter(|| interpolate(black_box("plain message with no holes"), &lookup));
    });

    group.bench_function("two_scalars", |b| {
        b.iter(|| interpolate(black_box("{user} placed order {order}"), &lookup));
    });

    group.bench_function("composite_value", |b| {
        b.iter(|| interpolate(black_box("cart: {items}"), &lookup));
    });

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let mut single = Logger::new("bench");
    single.add_null(Level::Debug);
    group.bench_function("one_null_handler", |b| {
        b.iter(|| single.info(black_box("benchmark message")));
    });

    let mut fan_out = Logger::new("bench");
    for _ in 0..8 {
        fan_out.add_null(Level::Debug);
    }
    group.bench_function("eight_null_handlers", |b| {
        b.iter(|| fan_out.info(black_box("benchmark message")));
    });

    let mut gated = Logger::new("bench");
    gated.add_null(Level::Error);
    group.bench_function("gated_below_threshold", |b| {
        b.iter(|| gated.debug(black_box("dropped before formatting")));
    });

    group.finish();
}

// ============================================================================
// Sampling Benchmarks
// ============================================================================

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling");
    group.throughput(Throughput::Elements(1));

    let mut percentage = Logger::new("bench");
    percentage.add_handler(Box::new(SamplingHandler::new(
        Box::new(NullHandler::new(Level::Debug)),
        SamplingStrategy::Percentage { percentage: 10 },
    )));
    group.bench_function("percentage_gate", |b| {
        b.iter(|| percentage.info(black_box("sampled message")));
    });

    let mut fingerprint = Logger::new("bench");
    fingerprint.add_handler(Box::new(SamplingHandler::new(
        Box::new(NullHandler::new(Level::Debug)),
        SamplingStrategy::Fingerprint { window_seconds: 60 },
    )));
    group.bench_function("fingerprint_dedup", |b| {
        b.iter(|| fingerprint.info(black_box("repeated message")));
    });

    group.finish();
}

criterion_group!(benches, bench_interpolation, bench_dispatch, bench_sampling);
criterion_main!(benches);
