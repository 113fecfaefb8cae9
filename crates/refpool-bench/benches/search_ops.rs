//! Criterion micro-benchmarks for k-d tree construction and incremental
//! nearest-neighbor search.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use refpool_bench::reference_profile;
use refpool_kdtree::{IncrementalNearestNeighborSearch, KdTree};
use refpool_test_utils::indexed;

fn bench_build_10k(c: &mut Criterion) {
    let profile = reference_profile(42).unwrap();
    c.bench_function("kdtree_build_10k", |b| {
        b.iter(|| {
            let tree = KdTree::build(profile.n, indexed(&profile.points)).unwrap();
            black_box(tree.size());
        });
    });
}

fn bench_first_neighbor(c: &mut Criterion) {
    let profile = reference_profile(42).unwrap();
    let mut search = IncrementalNearestNeighborSearch::new(&profile.tree).unwrap();
    c.bench_function("search_first_neighbor_10k", |b| {
        b.iter(|| {
            for q in &profile.queries {
                search.search(q).unwrap();
                black_box(search.next());
            }
        });
    });
}

fn bench_k10(c: &mut Criterion) {
    let profile = reference_profile(42).unwrap();
    let mut search = IncrementalNearestNeighborSearch::new(&profile.tree).unwrap();
    c.bench_function("search_k10_10k", |b| {
        b.iter(|| {
            for q in &profile.queries {
                search.search(q).unwrap();
                for nb in search.by_ref().take(10) {
                    black_box(nb);
                }
            }
        });
    });
}

fn bench_full_drain(c: &mut Criterion) {
    let profile = reference_profile(42).unwrap();
    let mut search = IncrementalNearestNeighborSearch::new(&profile.tree).unwrap();
    let q = &profile.queries[0];
    c.bench_function("search_full_drain_10k", |b| {
        b.iter(|| {
            search.search(q).unwrap();
            black_box(search.by_ref().count());
        });
    });
}

criterion_group!(
    benches,
    bench_build_10k,
    bench_first_neighbor,
    bench_k10,
    bench_full_drain
);
criterion_main!(benches);
