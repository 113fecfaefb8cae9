//! The record pool: storage, free list, and reference factory.
//!
//! A [`Pool`] owns the record storage for one [`Layout`], the free list of
//! reclaimed record indices, and per-slot generation counters used for
//! stale-reference detection. It is an ordinary owned value: one pool per
//! record kind instance, passed by `&` / `&mut` to whatever allocates
//! from it or reads through it.
//!
//! # Allocation
//!
//! `create` prefers the free list over growth. A fresh index is taken from
//! the high-water mark only when the free list is empty, and storage grows
//! only when the high-water mark reaches capacity. Growth never changes an
//! existing record's index.
//!
//! # Record kinds
//!
//! The type parameter `K` is a marker for the record kind. It keeps
//! references and attributes of different pools apart at compile time and
//! supplies the uninitialised-state hook through [`PoolObject`].

use std::marker::PhantomData;
use std::sync::Arc;

use refpool_core::{PoolError, PoolId, RecordIndex};

use crate::attribute::{AttributeChange, AttributeListener};
use crate::config::PoolConfig;
use crate::handle::{Ref, UNPOINTED};
use crate::iter::{PoolCursor, PoolIter};
use crate::layout::Layout;
use crate::segment::RecordStorage;

/// A record kind that can live in a [`Pool`].
pub trait PoolObject: Sized + 'static {
    /// Put a record into its "uninitialised" state.
    ///
    /// Called on every record handed out by `create` and on every record
    /// passed to `delete`. The default zero-fills the record, so stale
    /// attribute values from a reused slot never read as valid data.
    /// Kinds whose `init` writes every field may override this with a
    /// no-op.
    fn set_to_uninitialized_state(record: &mut [u8]) {
        record.fill(0);
    }
}

/// Occupancy and memory figures for one pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Records currently live.
    pub live: usize,
    /// Reclaimed indices waiting for reuse.
    pub free: usize,
    /// Indices ever handed out since construction or the last `clear`.
    pub high_water: usize,
    /// Records storage has room for.
    pub capacity: usize,
    /// Number of times storage has grown.
    pub grow_events: u64,
    /// Bytes held by record storage.
    pub memory_bytes: usize,
}

/// A growable pool of fixed-layout records.
pub struct Pool<K> {
    id: PoolId,
    layout: Arc<Layout>,
    storage: RecordStorage,
    /// Indices `0..allocated` have been handed out at least once since
    /// the last `clear`; each is either live or on the free list.
    allocated: u32,
    free_list: Vec<u32>,
    /// Liveness per handed-out index, for iteration and validation.
    live: Vec<bool>,
    /// Per-slot generation, bumped on delete.
    generations: Vec<u32>,
    /// Bumped on `clear`; invalidates every outstanding reference.
    epoch: u32,
    listeners: Vec<Box<dyn AttributeListener>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: PoolObject> Pool<K> {
    /// Create a pool for `layout` with the given configuration.
    pub fn new(layout: impl Into<Arc<Layout>>, config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let layout = layout.into();
        let storage = RecordStorage::new(layout.size_in_bytes(), &config);
        let initial = config.initial_capacity as usize;
        Ok(Self {
            id: PoolId::next(),
            layout,
            storage,
            allocated: 0,
            free_list: Vec::new(),
            live: Vec::with_capacity(initial),
            generations: Vec::with_capacity(initial),
            epoch: 0,
            listeners: Vec::new(),
            _kind: PhantomData,
        })
    }

    /// Create a single-array pool with room for `initial_capacity` records.
    pub fn with_capacity(
        layout: impl Into<Arc<Layout>>,
        initial_capacity: u32,
    ) -> Result<Self, PoolError> {
        Self::new(layout, PoolConfig::new(initial_capacity))
    }

    /// This pool's unique id.
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// The record layout shared by every record of this pool.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Number of live (non-free) records.
    pub fn size(&self) -> usize {
        self.allocated as usize - self.free_list.len()
    }

    /// Whether the pool holds no live records.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of records storage currently has room for.
    pub fn capacity(&self) -> usize {
        self.storage.capacity() as usize
    }

    /// Occupancy and memory figures.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            live: self.size(),
            free: self.free_list.len(),
            high_water: self.allocated as usize,
            capacity: self.capacity(),
            grow_events: self.storage.grow_events(),
            memory_bytes: self.storage.memory_bytes(),
        }
    }

    /// Allocate an unpointed reference. O(1), touches no record storage.
    pub fn create_ref(&self) -> Ref<K> {
        Ref::unpointed(self.id)
    }

    /// Give back a reference obtained from [`create_ref`](Self::create_ref)
    /// or [`create`](Self::create).
    ///
    /// The record it points at is unaffected; only the reference ends.
    pub fn release_ref(&self, r: Ref<K>) {
        debug_assert_eq!(r.pool, self.id, "reference released to a foreign pool");
    }

    /// Allocate a record and return a new reference to it.
    pub fn create(&mut self) -> Ref<K> {
        let mut r = self.create_ref();
        self.create_into(&mut r);
        r
    }

    /// Allocate a record and repoint `r` at it.
    ///
    /// This is the zero-allocation idiom: a caller-owned reference is
    /// reused for each new record. Whatever `r` pointed at before is left
    /// alone.
    ///
    /// # Panics
    ///
    /// Panics if the pool is at `max_records`. Running out of record
    /// space is treated like running out of memory.
    pub fn create_into(&mut self, r: &mut Ref<K>) -> RecordIndex {
        match self.try_create_into(r) {
            Ok(index) => index,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fallible form of [`create_into`](Self::create_into).
    pub fn try_create_into(&mut self, r: &mut Ref<K>) -> Result<RecordIndex, PoolError> {
        debug_assert_eq!(r.pool, self.id, "reference from a foreign pool");
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                let index = self.allocated;
                self.storage.ensure_capacity(index + 1)?;
                self.allocated += 1;
                self.live.push(false);
                if self.generations.len() <= index as usize {
                    self.generations.push(0);
                }
                index
            }
        };
        self.live[index as usize] = true;
        K::set_to_uninitialized_state(self.storage.record_mut(RecordIndex(index)));

        r.index = index;
        r.generation = self.generations[index as usize];
        r.epoch = self.epoch;
        Ok(RecordIndex(index))
    }

    /// Return the record `r` points at to the free list.
    ///
    /// Every reference pointed at that record, `r` included, becomes
    /// dangling. See the aliasing contract in [`crate::handle`].
    pub fn delete(&mut self, r: &Ref<K>) {
        self.debug_check(r);
        let index = r.index;
        K::set_to_uninitialized_state(self.storage.record_mut(RecordIndex(index)));
        let slot = index as usize;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.live[slot] = false;
        self.free_list.push(index);
    }

    /// Repoint `r` at the live record `index`.
    pub fn get_object(&self, index: RecordIndex, r: &mut Ref<K>) {
        debug_assert_eq!(r.pool, self.id, "reference from a foreign pool");
        debug_assert!(self.is_live(index), "record {index} is not live");
        r.index = index.0;
        r.generation = self.generations[index.as_usize()];
        r.epoch = self.epoch;
    }

    /// Whether `index` refers to a live record.
    pub fn is_live(&self, index: RecordIndex) -> bool {
        index.0 < self.allocated && self.live[index.as_usize()]
    }

    /// Drop every record at once.
    ///
    /// O(1) in the number of records. Storage is kept for reuse and every
    /// outstanding reference becomes stale. The next `create` starts from
    /// index 0 again.
    pub fn clear(&mut self) {
        self.allocated = 0;
        self.free_list.clear();
        self.live.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Validate `r` against this pool.
    ///
    /// Available in every build; attribute access runs the same check in
    /// debug builds only.
    pub fn check(&self, r: &Ref<K>) -> Result<(), PoolError> {
        if r.pool != self.id {
            return Err(PoolError::ForeignReference {
                expected: self.id,
                found: r.pool,
            });
        }
        if r.index == UNPOINTED {
            return Err(PoolError::Unpointed);
        }
        let slot = r.index as usize;
        let current = self.generations.get(slot).copied().unwrap_or(0);
        if r.epoch != self.epoch || r.index >= self.allocated || !self.live[slot] {
            return Err(PoolError::StaleReference {
                index: RecordIndex(r.index),
                expected_generation: r.generation,
                found_generation: current,
            });
        }
        if current != r.generation {
            return Err(PoolError::StaleReference {
                index: RecordIndex(r.index),
                expected_generation: r.generation,
                found_generation: current,
            });
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn debug_check(&self, r: &Ref<K>) {
        #[cfg(debug_assertions)]
        if let Err(e) = self.check(r) {
            panic!("{e}");
        }
        #[cfg(not(debug_assertions))]
        let _ = r;
    }

    /// Raw bytes of the record `r` points at.
    #[inline]
    pub fn record_bytes(&self, r: &Ref<K>) -> &[u8] {
        self.debug_check(r);
        self.storage.record(RecordIndex(r.index))
    }

    #[inline]
    pub(crate) fn record_bytes_mut(&mut self, r: &Ref<K>) -> &mut [u8] {
        self.debug_check(r);
        self.storage.record_mut(RecordIndex(r.index))
    }

    /// Overwrite the record `to` points at with the bytes of `from`.
    ///
    /// Listeners are not notified.
    pub fn copy_record(&mut self, from: &Ref<K>, to: &Ref<K>) {
        self.debug_check(from);
        self.debug_check(to);
        self.storage
            .copy_record(RecordIndex(from.index), RecordIndex(to.index));
    }

    /// Register a listener for notifying attribute writes.
    pub fn add_listener(&mut self, listener: impl AttributeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn notify_before_change(
        &mut self,
        slot: usize,
        r: &Ref<K>,
        offset: usize,
        size: usize,
    ) {
        if self.listeners.is_empty() {
            return;
        }
        self.debug_check(r);
        let attribute = self
            .layout
            .attribute_at(slot)
            .map(|def| def.name.as_str())
            .unwrap_or_default();
        let bytes = self.storage.record(RecordIndex(r.index));
        let change = AttributeChange {
            attribute,
            index: RecordIndex(r.index),
            previous: &bytes[offset..offset + size],
        };
        for listener in &mut self.listeners {
            listener.before_attribute_change(&change);
        }
    }

    /// Iterate live records in index order, yielding a fresh reference
    /// for each.
    pub fn iter(&self) -> PoolIter<'_, K> {
        PoolIter::new(self)
    }

    /// A cursor that walks live records by repointing one caller-owned
    /// reference.
    pub fn cursor(&self) -> PoolCursor {
        PoolCursor::new()
    }

    pub(crate) fn high_water(&self) -> u32 {
        self.allocated
    }

    /// `(generation, epoch)` of a live record, `None` otherwise. Two equal
    /// stamps for one index name the same record incarnation.
    pub(crate) fn live_stamp(&self, index: RecordIndex) -> Option<(u32, u32)> {
        self.is_live(index)
            .then(|| (self.generations[index.as_usize()], self.epoch))
    }
}

impl<'a, K: PoolObject> IntoIterator for &'a Pool<K> {
    type Item = Ref<K>;
    type IntoIter = PoolIter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
