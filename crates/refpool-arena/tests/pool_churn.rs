//! Integration test: pool occupancy under create/delete churn.
//!
//! Runs many rounds of allocating and freeing records through the public
//! API and checks that the free list keeps the high-water mark bounded,
//! that growth never disturbs existing records, and that the flyweight
//! idiom (one reference reused for every record) allocates nothing on
//! the pool side.

use refpool_arena::{
    DoubleArrayAttribute, IntAttribute, Layout, Pool, PoolConfig, PoolObject, Ref,
};
use refpool_core::{PoolError, RecordIndex};

struct Particle;
impl PoolObject for Particle {}

struct Particles {
    pool: Pool<Particle>,
    id: IntAttribute<Particle>,
    pos: DoubleArrayAttribute<Particle>,
}

fn particles(config: PoolConfig) -> Particles {
    let mut b = Layout::builder();
    let id = b.int_field("id");
    let pos = b.double_array_field("pos", 3);
    let pool = Pool::new(b.build().unwrap(), config).unwrap();
    Particles {
        id: IntAttribute::new(id, &pool),
        pos: DoubleArrayAttribute::new(pos, &pool),
        pool,
    }
}

#[test]
fn churn_keeps_high_water_bounded() {
    let mut p = particles(PoolConfig::new(8));
    let mut live: Vec<Ref<Particle>> = Vec::new();

    for round in 0..200 {
        for k in 0..10 {
            let r = p.pool.create();
            p.id.set_quiet(&mut p.pool, &r, round * 10 + k);
            live.push(r);
        }
        // Free the oldest half.
        for r in live.drain(..5) {
            p.pool.delete(&r);
        }
        if live.len() > 50 {
            for r in live.drain(..live.len() - 50) {
                p.pool.delete(&r);
            }
        }
    }

    let stats = p.pool.stats();
    assert_eq!(stats.live, live.len());
    // Steady state never needs more than the peak live set plus one round.
    assert!(stats.high_water <= 60, "high water {}", stats.high_water);
    for r in &live {
        assert!(p.pool.check(r).is_ok());
    }
}

#[test]
fn growth_is_stable_in_both_storage_modes() {
    for config in [PoolConfig::new(1), PoolConfig::segmented(0, 8)] {
        let mut p = particles(config);
        let mut r = p.pool.create_ref();
        for i in 0..1000 {
            let index = p.pool.create_into(&mut r);
            assert_eq!(index, RecordIndex(i as u32));
            p.id.set_quiet(&mut p.pool, &r, i);
            p.pos.set_all_quiet(&mut p.pool, &r, &[i as f64, -(i as f64), 0.5]);
        }
        for i in 0..1000 {
            p.pool.get_object(RecordIndex(i as u32), &mut r);
            assert_eq!(p.id.get(&p.pool, &r), i);
            assert_eq!(p.pos.get(&p.pool, &r, 1), -(i as f64));
        }
        assert!(p.pool.stats().grow_events > 0);
    }
}

#[test]
fn flyweight_reuse_needs_no_new_references() {
    let mut p = particles(PoolConfig::new(64));
    let mut r = p.pool.create_ref();
    for i in 0..64 {
        p.pool.create_into(&mut r);
        p.id.set_quiet(&mut p.pool, &r, i);
    }
    let before = p.pool.stats();

    let mut sum = 0;
    let mut cursor = p.pool.cursor();
    while cursor.advance(&p.pool, &mut r) {
        sum += p.id.get(&p.pool, &r);
    }
    assert_eq!(sum, (0..64).sum::<i32>());
    assert_eq!(p.pool.stats(), before);
}

#[test]
fn stale_alias_is_detected_after_reuse() {
    let mut p = particles(PoolConfig::new(4));
    let a = p.pool.create();
    let mut alias = p.pool.create_ref();
    alias.repoint_to(&a);

    p.pool.delete(&a);
    let b = p.pool.create();
    assert_eq!(b.index(), alias.index());
    assert!(matches!(
        p.pool.check(&alias),
        Err(PoolError::StaleReference { .. })
    ));
    assert!(p.pool.check(&b).is_ok());
}

#[test]
fn clear_then_refill_reuses_storage() {
    let mut p = particles(PoolConfig::new(16));
    for _ in 0..16 {
        let _ = p.pool.create();
    }
    let capacity = p.pool.capacity();
    p.pool.clear();
    for _ in 0..16 {
        let _ = p.pool.create();
    }
    assert_eq!(p.pool.capacity(), capacity);
    assert_eq!(p.pool.stats().grow_events, 0);
    assert_eq!(p.pool.size(), 16);
}
