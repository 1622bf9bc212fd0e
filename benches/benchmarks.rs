//! Benchmark suite for trackmark.
//!
//! This module provides performance benchmarks for:
//! - Content hashing (exact and normalized)
//! - Deep progress calculation, cached and uncached
//! - Ancestor propagation on wide and deep trees
//! - State store save/load round trips
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Save baseline for comparison
//! cargo bench -- --save-baseline main
//!
//! # Compare against baseline
//! cargo bench -- --baseline main
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

use trackmark::testing::fixtures;
use trackmark::{
    calculate_deep_progress, compute_content_hash, compute_normalized_hash,
    propagate_status_change, ProgressCache, StateStore, StatusMap, TrackingStatus,
};

// ============================================================================
// Hashing Benchmarks
// ============================================================================

/// Benchmark hashing of documents of increasing size.
fn bench_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashing");

    for kb in [1, 10, 100] {
        let text = create_document(kb * 1024);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("exact", kb), &text, |b, text| {
            b.iter(|| black_box(compute_content_hash(black_box(text))));
        });
        group.bench_with_input(BenchmarkId::new("normalized", kb), &text, |b, text| {
            b.iter(|| black_box(compute_normalized_hash(black_box(text))));
        });
    }

    group.finish();
}

// ============================================================================
// Progress Benchmarks
// ============================================================================

/// Benchmark deep progress over a sectioned document, with and without the cache.
fn bench_deep_progress(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_progress");

    for sections in [10, 100] {
        let tree = fixtures::sectioned_document(sections, 20);
        let statuses = half_complete(&tree);

        group.bench_with_input(BenchmarkId::new("uncached", sections), &tree, |b, tree| {
            b.iter(|| {
                for root in tree {
                    black_box(calculate_deep_progress(black_box(root), &statuses));
                }
            });
        });

        let mut cache = ProgressCache::new();
        group.bench_with_input(BenchmarkId::new("cached", sections), &tree, |b, tree| {
            b.iter(|| {
                for root in tree {
                    black_box(cache.deep_progress(black_box(root), &statuses));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark propagation from a leaf on wide and deep trees.
fn bench_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation");

    let wide = fixtures::sectioned_document(50, 50);
    let mut statuses = half_complete(&wide);
    statuses.insert("section-0/item-0".to_string(), TrackingStatus::Complete);
    group.bench_function("wide_leaf", |b| {
        b.iter(|| black_box(propagate_status_change("section-0/item-0", &wide, &statuses)));
    });

    for depth in [100, 500] {
        let chain = vec![fixtures::deep_chain(depth)];
        let leaf = format!("node-{depth}");
        let mut statuses = StatusMap::new();
        statuses.insert(leaf.clone(), TrackingStatus::InProgress);

        group.bench_with_input(BenchmarkId::new("deep_leaf", depth), &chain, |b, chain| {
            b.iter(|| black_box(propagate_status_change(&leaf, chain, &statuses)));
        });
    }

    group.finish();
}

// ============================================================================
// Store Benchmarks
// ============================================================================

/// Benchmark a save followed by a load of one file's state.
fn bench_store_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");
    let rt = tokio::runtime::Runtime::new().unwrap();

    for item_count in [10, 1000] {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = StateStore::new(temp_dir.path());
        let source = "/bench/plan.md";

        rt.block_on(async {
            store
                .get_or_create_file_state(source, "00000000")
                .await
                .expect("Failed to create state");
            store
                .update_item_statuses(
                    source,
                    (0..item_count).map(|i| (format!("item-{i}"), TrackingStatus::Complete)),
                )
                .await
                .expect("Failed to seed items");
        });

        group.throughput(Throughput::Elements(item_count as u64));
        group.bench_function(BenchmarkId::new("save_load", item_count), |b| {
            b.iter(|| {
                rt.block_on(async {
                    let mut state = store
                        .load_file_state(source)
                        .await
                        .expect("load failed")
                        .expect("state missing");
                    store.save_file_state(&mut state).await.expect("save failed");
                    black_box(state)
                })
            });
        });
    }

    group.finish();
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Markdown-like text of roughly `bytes` length with mixed whitespace.
fn create_document(bytes: usize) -> String {
    let mut text = String::with_capacity(bytes + 64);
    let mut line = 0;
    while text.len() < bytes {
        match line % 4 {
            0 => text.push_str(&format!("# Section {line}\r\n\r\n")),
            1 => text.push_str(&format!("- [ ] task   {line}  \n")),
            2 => text.push_str(&format!("- [x] done\t{line}\n\n\n")),
            _ => text.push_str(&format!("  - nested item {line}\n")),
        }
        line += 1;
    }
    text
}

/// Mark every other leaf complete.
fn half_complete(tree: &[trackmark::TrackableItem]) -> StatusMap {
    let mut statuses = StatusMap::new();
    for root in tree {
        for (i, item) in root.descendants().filter(|d| !d.has_children()).enumerate() {
            if i % 2 == 0 {
                statuses.insert(item.id.clone(), TrackingStatus::Complete);
            }
        }
    }
    statuses
}

criterion_group!(
    benches,
    bench_hashing,
    bench_deep_progress,
    bench_propagation,
    bench_store_round_trip,
);
criterion_main!(benches);
