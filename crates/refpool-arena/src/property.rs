//! Per-record side tables.
//!
//! A [`PropertyMap`] attaches a value of any type to records of one pool
//! without widening the record layout: colours, labels, or anything that
//! is not plain fixed-size data. Values live on the Rust heap, indexed by
//! record index.
//!
//! Each entry is stamped with the generation and epoch of the record it
//! was set on. Deleting the record, or clearing the pool, invalidates the
//! stamp, so the entry reads as absent and a later record reusing the
//! slot starts with no value. The stale value itself is dropped lazily,
//! on the next `set`/`remove` at that index or on [`PropertyMap::prune`].

use std::marker::PhantomData;

use refpool_core::{PoolId, RecordIndex};

use crate::handle::Ref;
use crate::pool::{Pool, PoolObject};

struct Entry<T> {
    stamp: (u32, u32),
    value: T,
}

/// Values of type `T` keyed by records of kind `K`.
pub struct PropertyMap<K, T> {
    pool: PoolId,
    entries: Vec<Option<Entry<T>>>,
    _kind: PhantomData<fn() -> K>,
}

/// `i32` values per record.
pub type IntPropertyMap<K> = PropertyMap<K, i32>;
/// `f64` values per record.
pub type DoublePropertyMap<K> = PropertyMap<K, f64>;

impl<K: PoolObject, T> PropertyMap<K, T> {
    /// Create an empty map for records of `pool`.
    pub fn new(pool: &Pool<K>) -> Self {
        Self {
            pool: pool.id(),
            entries: Vec::new(),
            _kind: PhantomData,
        }
    }

    fn slot(&self, pool: &Pool<K>, r: &Ref<K>) -> (RecordIndex, Option<(u32, u32)>) {
        debug_assert_eq!(self.pool, pool.id(), "property map used with a foreign pool");
        pool.debug_check(r);
        let index = r.index();
        (index, pool.live_stamp(index))
    }

    fn current(&self, index: RecordIndex, stamp: Option<(u32, u32)>) -> Option<&Entry<T>> {
        let entry = self.entries.get(index.as_usize())?.as_ref()?;
        (Some(entry.stamp) == stamp).then_some(entry)
    }

    /// Value set on the record `r` points at, if any.
    pub fn get(&self, pool: &Pool<K>, r: &Ref<K>) -> Option<&T> {
        let (index, stamp) = self.slot(pool, r);
        self.current(index, stamp).map(|e| &e.value)
    }

    /// Whether a value is set on the record `r` points at.
    pub fn is_set(&self, pool: &Pool<K>, r: &Ref<K>) -> bool {
        self.get(pool, r).is_some()
    }

    /// Set the value for the record `r` points at, returning the previous
    /// one.
    pub fn set(&mut self, pool: &Pool<K>, r: &Ref<K>, value: T) -> Option<T> {
        let (index, stamp) = self.slot(pool, r);
        let Some(stamp) = stamp else {
            // Only reachable in release builds with a dead reference.
            return None;
        };
        let i = index.as_usize();
        if self.entries.len() <= i {
            self.entries.resize_with(i + 1, || None);
        }
        let previous = self.entries[i].replace(Entry { stamp, value });
        previous.filter(|e| e.stamp == stamp).map(|e| e.value)
    }

    /// Remove and return the value for the record `r` points at.
    pub fn remove(&mut self, pool: &Pool<K>, r: &Ref<K>) -> Option<T> {
        let (index, stamp) = self.slot(pool, r);
        let slot = self.entries.get_mut(index.as_usize())?;
        match slot {
            Some(e) if Some(e.stamp) == stamp => slot.take().map(|e| e.value),
            _ => None,
        }
    }

    /// Number of records that currently have a value.
    pub fn len(&self, pool: &Pool<K>) -> usize {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, e)| {
                e.as_ref()
                    .is_some_and(|e| Some(e.stamp) == pool.live_stamp(RecordIndex(*i as u32)))
            })
            .count()
    }

    /// Whether no record has a value.
    pub fn is_empty(&self, pool: &Pool<K>) -> bool {
        self.len(pool) == 0
    }

    /// Drop values left behind by deleted records.
    pub fn prune(&mut self, pool: &Pool<K>) {
        for (i, slot) in self.entries.iter_mut().enumerate() {
            let stale = slot
                .as_ref()
                .is_some_and(|e| Some(e.stamp) != pool.live_stamp(RecordIndex(i as u32)));
            if stale {
                *slot = None;
            }
        }
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: PoolObject, T: Copy> PropertyMap<K, T> {
    /// Value for the record `r` points at, or `no_entry` if unset.
    pub fn get_or(&self, pool: &Pool<K>, r: &Ref<K>, no_entry: T) -> T {
        self.get(pool, r).copied().unwrap_or(no_entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::DoubleAttribute;
    use crate::layout::Layout;

    struct Vector3;
    impl PoolObject for Vector3 {}

    fn vectors(n: usize) -> (Pool<Vector3>, DoubleAttribute<Vector3>, Vec<Ref<Vector3>>) {
        let mut b = Layout::builder();
        let x = b.double_field("x");
        let mut pool = Pool::with_capacity(b.build().unwrap(), 4).unwrap();
        let x = DoubleAttribute::new(x, &pool);
        let refs = (0..n)
            .map(|i| {
                let r = pool.create();
                x.set_quiet(&mut pool, &r, i as f64);
                r
            })
            .collect();
        (pool, x, refs)
    }

    #[test]
    fn set_get_and_overwrite() {
        let (pool, _, refs) = vectors(10);
        let mut color: PropertyMap<Vector3, String> = PropertyMap::new(&pool);
        for r in refs.iter().step_by(2) {
            assert_eq!(color.set(&pool, r, "blue".to_string()), None);
        }
        assert_eq!(color.len(&pool), 5);
        assert_eq!(color.get(&pool, &refs[4]).map(String::as_str), Some("blue"));
        assert!(!color.is_set(&pool, &refs[5]));

        let previous = color.set(&pool, &refs[4], "red".to_string());
        assert_eq!(previous.as_deref(), Some("blue"));
        assert_eq!(color.get(&pool, &refs[4]).map(String::as_str), Some("red"));
        assert_eq!(color.len(&pool), 5);
    }

    #[test]
    fn no_entry_value_for_unset_records() {
        let (pool, _, refs) = vectors(3);
        let mut radius: DoublePropertyMap<Vector3> = PropertyMap::new(&pool);
        radius.set(&pool, &refs[0], 2.5);
        assert_eq!(radius.get_or(&pool, &refs[0], f64::NEG_INFINITY), 2.5);
        assert_eq!(radius.get_or(&pool, &refs[1], f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn remove_returns_value_once() {
        let (pool, _, refs) = vectors(2);
        let mut tags: IntPropertyMap<Vector3> = PropertyMap::new(&pool);
        tags.set(&pool, &refs[1], 7);
        assert_eq!(tags.remove(&pool, &refs[1]), Some(7));
        assert_eq!(tags.remove(&pool, &refs[1]), None);
        assert_eq!(tags.remove(&pool, &refs[0]), None);
        assert!(tags.is_empty(&pool));
    }

    #[test]
    fn delete_drops_value_for_reused_slot() {
        let (mut pool, _, refs) = vectors(3);
        let mut tags: IntPropertyMap<Vector3> = PropertyMap::new(&pool);
        tags.set(&pool, &refs[1], 42);
        pool.delete(&refs[1]);
        assert_eq!(tags.len(&pool), 0);

        let reused = pool.create();
        assert_eq!(reused.index(), refs[1].index());
        assert_eq!(tags.get(&pool, &reused), None);
        assert_eq!(tags.set(&pool, &reused, 1), None);
        assert_eq!(tags.get(&pool, &reused), Some(&1));
    }

    #[test]
    fn pool_clear_drops_every_value() {
        let (mut pool, _, refs) = vectors(4);
        let mut tags: IntPropertyMap<Vector3> = PropertyMap::new(&pool);
        for (i, r) in refs.iter().enumerate() {
            tags.set(&pool, r, i as i32);
        }
        pool.clear();
        let fresh = pool.create();
        assert_eq!(tags.get(&pool, &fresh), None);
        assert!(tags.is_empty(&pool));
    }

    #[test]
    fn aliases_share_one_entry() {
        let (pool, _, refs) = vectors(2);
        let mut tags: IntPropertyMap<Vector3> = PropertyMap::new(&pool);
        let mut alias = pool.create_ref();
        pool.get_object(refs[0].index(), &mut alias);
        tags.set(&pool, &alias, 9);
        assert_eq!(tags.get(&pool, &refs[0]), Some(&9));
    }

    #[test]
    fn prune_keeps_live_values() {
        let (mut pool, _, refs) = vectors(4);
        let mut tags: IntPropertyMap<Vector3> = PropertyMap::new(&pool);
        for r in &refs {
            tags.set(&pool, r, 1);
        }
        pool.delete(&refs[0]);
        pool.delete(&refs[2]);
        tags.prune(&pool);
        assert_eq!(tags.len(&pool), 2);
        assert!(tags.entries[0].is_none());
        assert!(tags.entries[2].is_none());
        assert_eq!(tags.get(&pool, &refs[3]), Some(&1));

        tags.clear();
        assert!(tags.is_empty(&pool));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "stale reference")]
    fn debug_build_panics_on_deleted_record() {
        let (mut pool, _, refs) = vectors(1);
        let tags: IntPropertyMap<Vector3> = PropertyMap::new(&pool);
        pool.delete(&refs[0]);
        let _ = tags.get(&pool, &refs[0]);
    }
}
