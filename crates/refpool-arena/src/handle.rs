//! Flyweight references into a pool.
//!
//! A [`Ref`] is the only thing client code holds for a pooled object: the
//! id of the pool that issued it and the record index it currently points
//! at. It owns no record data. Reading an attribute through a `Ref` reads
//! the pool's memory for that index *at the time of the read*.
//!
//! # Aliasing contract
//!
//! A `Ref` is not `Clone`. Two references point at the same
//! record only through an explicit call: [`Pool::get_object`],
//! [`Ref::repoint_to`], or re-running [`Pool::create_into`] on a reference
//! that is still in use elsewhere. Writes through one alias are visible
//! through every other alias.
//!
//! Repointing a reference (by `create_into`, `get_object`, a cursor step,
//! or a queue `poll_into`) changes what every later read through it
//! returns. Values read before the repoint are copies and are not updated;
//! values read after it come from the new record. Code that reuses one
//! `Ref` across many records must finish with one record before moving
//! to the next.
//!
//! After [`Pool::delete`], every reference still pointed at the deleted
//! record is dangling. Using it is a programmer error: release builds do
//! not detect it (and may read another object's data once the slot is
//! reused); debug builds panic with [`PoolError::StaleReference`].
//!
//! [`Pool::get_object`]: crate::pool::Pool::get_object
//! [`Pool::create_into`]: crate::pool::Pool::create_into
//! [`Pool::delete`]: crate::pool::Pool::delete
//! [`PoolError::StaleReference`]: refpool_core::PoolError::StaleReference

use std::fmt;
use std::marker::PhantomData;

use refpool_core::{PoolId, RecordIndex};

/// Sentinel index of a reference that points at nothing.
pub(crate) const UNPOINTED: u32 = u32::MAX;

/// A repointable reference to one record of kind `K`.
#[must_use]
pub struct Ref<K> {
    pub(crate) pool: PoolId,
    pub(crate) index: u32,
    /// Slot generation when this reference was pointed.
    pub(crate) generation: u32,
    /// Pool epoch when this reference was pointed.
    pub(crate) epoch: u32,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Ref<K> {
    pub(crate) fn unpointed(pool: PoolId) -> Self {
        Self {
            pool,
            index: UNPOINTED,
            generation: 0,
            epoch: 0,
            _kind: PhantomData,
        }
    }

    /// Internal copy used by collections that store references by value.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            pool: self.pool,
            index: self.index,
            generation: self.generation,
            epoch: self.epoch,
            _kind: PhantomData,
        }
    }

    /// The record index this reference points at.
    ///
    /// Debug builds panic if the reference is unpointed.
    #[inline]
    pub fn index(&self) -> RecordIndex {
        debug_assert!(self.is_pointed(), "reference is not pointed at any record");
        RecordIndex(self.index)
    }

    /// Whether this reference has been pointed at a record.
    pub fn is_pointed(&self) -> bool {
        self.index != UNPOINTED
    }

    /// Id of the pool that issued this reference.
    pub fn pool_id(&self) -> PoolId {
        self.pool
    }

    /// Point this reference at the same record as `other`.
    ///
    /// This is the explicit aliasing operation: afterwards both references
    /// read and write the same record.
    pub fn repoint_to(&mut self, other: &Ref<K>) {
        debug_assert_eq!(self.pool, other.pool, "repoint across pools");
        self.index = other.index;
        self.generation = other.generation;
        self.epoch = other.epoch;
    }

    /// Whether both references point at the same record of the same pool.
    pub fn same_record(&self, other: &Ref<K>) -> bool {
        self.pool == other.pool && self.index == other.index && self.is_pointed()
    }
}

impl<K> fmt::Debug for Ref<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pointed() {
            write!(
                f,
                "Ref(pool={}, index={}, gen={})",
                self.pool, self.index, self.generation
            )
        } else {
            write!(f, "Ref(pool={}, unpointed)", self.pool)
        }
    }
}
