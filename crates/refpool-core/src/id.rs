//! Strongly-typed identifiers and the [`Coord`] type alias.

use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Position of one record inside a pool.
///
/// Indices are dense and stable: a record keeps its index from `create`
/// until `delete`, and the index is only handed out again after it has
/// been returned to the pool's free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordIndex(pub u32);

impl RecordIndex {
    /// The index as a `usize`, for slice arithmetic.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RecordIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RecordIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`PoolId`] allocation.
static POOL_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a pool.
///
/// Allocated from a monotonic atomic counter via [`PoolId::next`]. Every
/// reference remembers the id of the pool that issued it, so handing a
/// reference to the wrong pool is detectable in debug builds even when
/// both pools share a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u64);

impl PoolId {
    /// Allocate a fresh, unique pool ID. Thread-safe.
    pub fn next() -> Self {
        Self(POOL_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A real-valued coordinate in N-dimensional space.
///
/// Uses `SmallVec<[f64; 4]>` to avoid heap allocation for query points
/// of up to four dimensions.
pub type Coord = SmallVec<[f64; 4]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_ids_are_unique() {
        let a = PoolId::next();
        let b = PoolId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn record_index_display_and_from() {
        let idx = RecordIndex::from(17);
        assert_eq!(idx.to_string(), "17");
        assert_eq!(idx.as_usize(), 17);
    }

    #[test]
    fn coord_stays_inline_for_small_dims() {
        let c: Coord = smallvec::smallvec![1.0, 2.0, 3.0];
        assert!(!c.spilled());
    }
}
