//! An ordered list of references into one pool.

use std::marker::PhantomData;

use refpool_core::{PoolId, RecordIndex};

use crate::handle::Ref;
use crate::pool::{Pool, PoolObject};

/// A growable list of record indices of kind `K`.
///
/// Elements are read back by repointing a caller-owned reference with
/// [`get`](Self::get). The list does not track deletions: removing a
/// record from the pool while it is listed leaves a dangling entry.
pub struct RefList<K> {
    pool: PoolId,
    indices: Vec<u32>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: PoolObject> RefList<K> {
    /// Create an empty list for references issued by `pool`.
    pub fn new(pool: &Pool<K>) -> Self {
        Self::with_capacity(pool, 0)
    }

    /// Create an empty list with room for `capacity` entries.
    pub fn with_capacity(pool: &Pool<K>, capacity: usize) -> Self {
        Self {
            pool: pool.id(),
            indices: Vec::with_capacity(capacity),
            _kind: PhantomData,
        }
    }

    /// Append the record `r` points at.
    pub fn add(&mut self, r: &Ref<K>) {
        debug_assert_eq!(r.pool_id(), self.pool, "reference from a foreign pool");
        self.indices.push(r.index().0);
    }

    /// Repoint `r` at element `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    pub fn get(&self, i: usize, pool: &Pool<K>, r: &mut Ref<K>) {
        pool.get_object(RecordIndex(self.indices[i]), r);
    }

    /// Record index of element `i`, if in range.
    pub fn index_at(&self, i: usize) -> Option<RecordIndex> {
        self.indices.get(i).copied().map(RecordIndex)
    }

    /// Remove element `i`, shifting later elements down.
    ///
    /// Returns the removed record index, or `None` if out of range.
    pub fn remove(&mut self, i: usize) -> Option<RecordIndex> {
        (i < self.indices.len()).then(|| RecordIndex(self.indices.remove(i)))
    }

    /// Whether the list contains the record `r` points at.
    pub fn contains(&self, r: &Ref<K>) -> bool {
        self.indices.contains(&r.index().0)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Remove all entries, keeping the allocation.
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Record indices in list order.
    pub fn iter(&self) -> impl Iterator<Item = RecordIndex> + '_ {
        self.indices.iter().copied().map(RecordIndex)
    }
}
