//! Criterion micro-benchmarks for pool allocation and attribute access.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use refpool_arena::{DoubleArrayAttribute, IntAttribute, Layout, Pool, PoolConfig, PoolObject};

struct Particle;
impl PoolObject for Particle {}

fn particle_pool(
    config: PoolConfig,
) -> (
    Pool<Particle>,
    IntAttribute<Particle>,
    DoubleArrayAttribute<Particle>,
) {
    let mut b = Layout::builder();
    let id = b.int_field("id");
    let pos = b.double_array_field("pos", 3);
    let pool = Pool::new(b.build().unwrap(), config).unwrap();
    let id = IntAttribute::new(id, &pool);
    let pos = DoubleArrayAttribute::new(pos, &pool);
    (pool, id, pos)
}

fn bench_create_10k(c: &mut Criterion) {
    c.bench_function("pool_create_10k", |b| {
        b.iter(|| {
            let (mut pool, id, _) = particle_pool(PoolConfig::new(16));
            let mut r = pool.create_ref();
            for i in 0..10_000 {
                pool.create_into(&mut r);
                id.set_quiet(&mut pool, &r, i);
            }
            black_box(pool.size());
        });
    });
}

fn bench_create_10k_segmented(c: &mut Criterion) {
    c.bench_function("pool_create_10k_segmented", |b| {
        b.iter(|| {
            let (mut pool, id, _) = particle_pool(PoolConfig::segmented(0, 1024));
            let mut r = pool.create_ref();
            for i in 0..10_000 {
                pool.create_into(&mut r);
                id.set_quiet(&mut pool, &r, i);
            }
            black_box(pool.size());
        });
    });
}

fn bench_churn(c: &mut Criterion) {
    let (mut pool, _, _) = particle_pool(PoolConfig::new(1024));
    let mut live: Vec<_> = (0..1024).map(|_| pool.create()).collect();
    c.bench_function("pool_delete_create_1k", |b| {
        b.iter(|| {
            for r in &live {
                pool.delete(r);
            }
            for r in &mut live {
                pool.create_into(r);
            }
            black_box(pool.stats().high_water);
        });
    });
}

fn bench_cursor_sum_10k(c: &mut Criterion) {
    let (mut pool, _, pos) = particle_pool(PoolConfig::new(10_000));
    let mut r = pool.create_ref();
    for i in 0..10_000 {
        pool.create_into(&mut r);
        pos.set_all_quiet(&mut pool, &r, &[i as f64, 0.5, -1.0]);
    }
    c.bench_function("pool_cursor_sum_10k", |b| {
        b.iter(|| {
            let mut cursor = pool.cursor();
            let mut sum = 0.0;
            while cursor.advance(&pool, &mut r) {
                sum += pos.get(&pool, &r, 0);
            }
            black_box(sum);
        });
    });
}

criterion_group!(
    benches,
    bench_create_10k,
    bench_create_10k_segmented,
    bench_churn,
    bench_cursor_sum_10k
);
criterion_main!(benches);
