//! Benchmarks for planner strategies.
//!
//! Run with: `cargo bench --bench query`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use regex::Regex;

use call_indexer::{CallIndex, CallLocation, CallQuery, CallRecord, Target};

const RECEIVERS: &[&str] = &["User", "Account", "Post", "Comment", "Session", "Audit"];
const METHODS: &[&str] = &["find", "where", "order", "update", "delete_all", "render"];

/// Synthetic batch spread evenly over receivers and methods.
fn build_index(size: usize) -> CallIndex {
    let records = (0..size).map(|i| {
        let receiver = RECEIVERS[i % RECEIVERS.len()];
        let method = METHODS[(i / RECEIVERS.len()) % METHODS.len()];
        CallRecord::new(method, Target::Name(receiver.into()))
            .with_chain(vec![Some(receiver.into()), Some(method.into())])
            .with_location(CallLocation::Class {
                name: format!("{receiver}Controller"),
            })
    });
    CallIndex::from_records(records)
}

fn bench_method_lookup(c: &mut Criterion) {
    let index = build_index(10_000);
    let query = CallQuery::new().with_method("find");

    c.bench_function("method_exact", |b| {
        b.iter(|| black_box(index.find_calls(black_box(&query))))
    });
}

fn bench_planner_strategy(c: &mut Criterion) {
    let index = build_index(10_000);
    let mut group = c.benchmark_group("planner_strategy");

    // Smaller method set: the method index is walked
    let query = CallQuery::new()
        .with_targets(["User", "Account", "Post", "Comment"])
        .with_methods(["find", "where"]);
    group.bench_function("method_side", |b| {
        b.iter(|| black_box(index.find_calls(black_box(&query))))
    });

    // Smaller target set: the target index is walked
    let query = CallQuery::new()
        .with_targets(["User", "Account"])
        .with_methods(["find", "where", "order", "update"]);
    group.bench_function("target_side", |b| {
        b.iter(|| black_box(index.find_calls(black_box(&query))))
    });

    group.finish();
}

fn bench_chain_query(c: &mut Criterion) {
    let index = build_index(10_000);
    let query = CallQuery::new()
        .with_method("where")
        .with_target("User")
        .chained();

    c.bench_function("chain_query", |b| {
        b.iter(|| black_box(index.find_calls(black_box(&query))))
    });
}

fn bench_target_pattern(c: &mut Criterion) {
    let index = build_index(10_000);
    let query = CallQuery::new().with_target_pattern(Regex::new("^(User|Account)$").unwrap());

    c.bench_function("target_pattern", |b| {
        b.iter(|| black_box(index.find_calls(black_box(&query))))
    });
}

criterion_group!(
    benches,
    bench_method_lookup,
    bench_planner_strategy,
    bench_chain_query,
    bench_target_pattern,
);
criterion_main!(benches);
