//! # Engine Benchmarks
//!
//! Load and query throughput through the bridge.
//!
//! Run with: `cargo bench -p tenet-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tenet_core::{Bridge, OutputMode};

/// A chain `edge(0,1). edge(1,2). ...` of `size` facts.
fn chain_program(size: usize) -> String {
    (0..size)
        .map(|i| format!("edge({},{}).", i, i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

const REACH_RULES: &str = "reach(X,Y) :- edge(X,Y).\nreach(X,Z) :- reach(X,Y), edge(Y,Z).";

fn loaded_bridge(size: usize, mode: OutputMode) -> Bridge {
    let mut bridge = Bridge::new(mode);
    let program = format!("{}\n{}", chain_program(size), REACH_RULES);
    if let Some(err) = bridge.define(&[program]) {
        eprintln!("bench setup failed: {}", err);
    }
    bridge
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_fact_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("fact_load");

    for size in [100, 1_000, 10_000] {
        let program = chain_program(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &program, |b, program| {
            b.iter(|| {
                let mut bridge = Bridge::new(OutputMode::Structured);
                black_box(bridge.define(&[program.as_str()]))
            });
        });
    }

    group.finish();
}

fn bench_transitive_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitive_closure");
    group.sample_size(20);

    for size in [10, 50, 100] {
        let program = format!("{}\n{}", chain_program(size), REACH_RULES);
        group.bench_with_input(BenchmarkId::from_parameter(size), &program, |b, program| {
            b.iter(|| {
                let mut bridge = Bridge::new(OutputMode::Structured);
                black_box(bridge.define(&[program.as_str()]))
            });
        });
    }

    group.finish();
}

fn bench_query_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_encoding");

    for mode in [OutputMode::Structured, OutputMode::Flat] {
        let bridge = loaded_bridge(100, mode);
        group.bench_function(BenchmarkId::new("reach_all", mode), |b| {
            b.iter(|| black_box(bridge.query(&["reach(X,Y)"])));
        });
        group.bench_function(BenchmarkId::new("reach_from_0", mode), |b| {
            b.iter(|| black_box(bridge.query(&["reach(0,Y)"])));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fact_load,
    bench_transitive_closure,
    bench_query_encoding
);
criterion_main!(benches);
