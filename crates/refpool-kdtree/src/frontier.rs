//! The search frontier: a private pool of point and box entries.
//!
//! Each entry stands for either one tree node's point or the bounding box
//! of the subtree below a node. Layout, per `n`-dimensional tree:
//!
//! ```text
//! node_index  : index   tree node this entry refers to
//! split_dim   : i32     dimension the node splits on
//! is_point    : bool    point (true) or box (false)
//! orient[n]   : i8      -1 query below box, 0 inside, 1 at or above
//! axis_sq[n]  : f64     squared gap to the box on each dimension
//! sq_distance : f64     sum of axis_sq for a box; exact for a point
//! ```
//!
//! `sq_distance` is the priority. For a box it is a lower bound on the
//! squared distance from the query to any point in the subtree.

use std::cmp::Ordering;

use refpool_arena::{
    BooleanAttribute, ByteArrayAttribute, DoubleArrayAttribute, DoubleAttribute,
    IndexAttribute, IntAttribute, Layout, Pool, PoolObject, Ref, RefComparator,
};
use refpool_core::RecordIndex;

use crate::error::KdTreeError;

/// Record kind for frontier entries.
pub struct FrontierEntry;

impl PoolObject for FrontierEntry {
    // `init` and `init_from_parent` write every field.
    fn set_to_uninitialized_state(_record: &mut [u8]) {}
}

/// Orders frontier entries by their stored squared distance.
///
/// Reads the field through the attribute on every comparison, so the
/// queue always sees the latest value written to an entry.
#[derive(Clone, Copy)]
pub struct ByDistance {
    sq_distance: DoubleAttribute<FrontierEntry>,
}

impl RefComparator<FrontierEntry> for ByDistance {
    fn compare(
        &self,
        pool: &Pool<FrontierEntry>,
        a: &Ref<FrontierEntry>,
        b: &Ref<FrontierEntry>,
    ) -> Ordering {
        self.sq_distance
            .get(pool, a)
            .total_cmp(&self.sq_distance.get(pool, b))
    }
}

/// Pool of frontier entries for one search instance.
pub struct FrontierPool {
    n: usize,
    pool: Pool<FrontierEntry>,
    node_index: IndexAttribute<FrontierEntry>,
    split_dim: IntAttribute<FrontierEntry>,
    is_point: BooleanAttribute<FrontierEntry>,
    orient: ByteArrayAttribute<FrontierEntry>,
    axis_sq: DoubleArrayAttribute<FrontierEntry>,
    sq_distance: DoubleAttribute<FrontierEntry>,
}

impl FrontierPool {
    /// Initial number of entries a frontier pool has room for.
    pub const DEFAULT_CAPACITY: u32 = 50;

    /// Create a frontier pool for an `n`-dimensional tree.
    pub fn new(n: usize) -> Result<Self, KdTreeError> {
        Self::with_capacity(n, Self::DEFAULT_CAPACITY)
    }

    /// Create a frontier pool with room for `capacity` entries.
    pub fn with_capacity(n: usize, capacity: u32) -> Result<Self, KdTreeError> {
        if n == 0 {
            return Err(KdTreeError::ZeroDimensions);
        }
        let mut b = Layout::builder();
        let node_index = b.index_field("node_index");
        let split_dim = b.int_field("split_dim");
        let is_point = b.boolean_field("is_point");
        let orient = b.byte_array_field("orient", n);
        let axis_sq = b.double_array_field("axis_sq", n);
        let sq_distance = b.double_field("sq_distance");
        let pool: Pool<FrontierEntry> = Pool::with_capacity(b.build()?, capacity)?;
        Ok(Self {
            n,
            node_index: IndexAttribute::new(node_index, &pool),
            split_dim: IntAttribute::new(split_dim, &pool),
            is_point: BooleanAttribute::new(is_point, &pool),
            orient: ByteArrayAttribute::new(orient, &pool),
            axis_sq: DoubleArrayAttribute::new(axis_sq, &pool),
            sq_distance: DoubleAttribute::new(sq_distance, &pool),
            pool,
        })
    }

    /// Dimensionality of the entries.
    pub fn num_dimensions(&self) -> usize {
        self.n
    }

    /// The underlying record pool.
    pub fn pool(&self) -> &Pool<FrontierEntry> {
        &self.pool
    }

    /// Comparator ordering entries by squared distance.
    pub fn comparator(&self) -> ByDistance {
        ByDistance {
            sq_distance: self.sq_distance,
        }
    }

    /// An unpointed entry reference.
    pub fn create_ref(&self) -> Ref<FrontierEntry> {
        self.pool.create_ref()
    }

    /// Allocate an entry and repoint `r` at it. Its fields are unset
    /// until one of the `init` calls.
    pub fn create_into(&mut self, r: &mut Ref<FrontierEntry>) -> RecordIndex {
        self.pool.create_into(r)
    }

    /// Return an entry to the pool.
    pub fn delete(&mut self, r: &Ref<FrontierEntry>) {
        self.pool.delete(r);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.pool.clear();
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.pool.size()
    }

    /// Initialise `r` as a box for `node` with zero distance on every
    /// dimension.
    pub fn init(&mut self, r: &Ref<FrontierEntry>, node: RecordIndex, split_dim: usize) {
        self.is_point.set_quiet(&mut self.pool, r, false);
        // Both inits store Some; node_index() never sees None after them.
        self.node_index.set_quiet(&mut self.pool, r, Some(node));
        self.split_dim.set_quiet(&mut self.pool, r, split_dim as i32);
        for d in 0..self.n {
            self.orient.set_quiet(&mut self.pool, r, d, 0);
            self.axis_sq.set_quiet(&mut self.pool, r, d, 0.0);
        }
        self.sq_distance.set_quiet(&mut self.pool, r, 0.0);
    }

    /// Initialise `r` as a box for `node` inheriting `parent`'s
    /// orientation and per-axis distances.
    pub fn init_from_parent(
        &mut self,
        r: &Ref<FrontierEntry>,
        node: RecordIndex,
        split_dim: usize,
        parent: &Ref<FrontierEntry>,
    ) {
        self.pool.copy_record(parent, r);
        self.is_point.set_quiet(&mut self.pool, r, false);
        self.node_index.set_quiet(&mut self.pool, r, Some(node));
        self.split_dim.set_quiet(&mut self.pool, r, split_dim as i32);
    }

    /// Tree node the entry refers to.
    pub fn node_index(&self, r: &Ref<FrontierEntry>) -> RecordIndex {
        let index = self.node_index.get(&self.pool, r);
        debug_assert!(index.is_some(), "frontier entry read before init");
        index.unwrap_or(RecordIndex(0))
    }

    /// Split dimension of the entry's node.
    pub fn split_dim(&self, r: &Ref<FrontierEntry>) -> usize {
        self.split_dim.get(&self.pool, r) as usize
    }

    /// Whether the entry is a point rather than a box.
    pub fn is_point(&self, r: &Ref<FrontierEntry>) -> bool {
        self.is_point.get(&self.pool, r)
    }

    /// Mark the entry as a point or a box.
    pub fn set_is_point(&mut self, r: &Ref<FrontierEntry>, value: bool) {
        self.is_point.set_quiet(&mut self.pool, r, value);
    }

    /// Orientation of the query relative to the box on dimension `d`.
    pub fn orient(&self, r: &Ref<FrontierEntry>, d: usize) -> i8 {
        self.orient.get(&self.pool, r, d)
    }

    /// Set the orientation on dimension `d`.
    pub fn set_orient(&mut self, r: &Ref<FrontierEntry>, d: usize, value: i8) {
        self.orient.set_quiet(&mut self.pool, r, d, value);
    }

    /// Squared gap to the box on dimension `d`.
    pub fn axis_squared_distance(&self, r: &Ref<FrontierEntry>, d: usize) -> f64 {
        self.axis_sq.get(&self.pool, r, d)
    }

    /// Set the squared gap on dimension `d`.
    pub fn set_axis_squared_distance(&mut self, r: &Ref<FrontierEntry>, d: usize, value: f64) {
        self.axis_sq.set_quiet(&mut self.pool, r, d, value);
    }

    /// The entry's priority.
    pub fn squared_distance(&self, r: &Ref<FrontierEntry>) -> f64 {
        self.sq_distance.get(&self.pool, r)
    }

    /// Set the entry's priority.
    pub fn set_squared_distance(&mut self, r: &Ref<FrontierEntry>, value: f64) {
        self.sq_distance.set_quiet(&mut self.pool, r, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_zeroes_every_axis() {
        let mut frontier = FrontierPool::new(3).unwrap();
        let mut r = frontier.create_ref();
        frontier.create_into(&mut r);
        frontier.init(&r, RecordIndex(4), 2);
        assert_eq!(frontier.node_index(&r), RecordIndex(4));
        assert_eq!(frontier.split_dim(&r), 2);
        assert!(!frontier.is_point(&r));
        for d in 0..3 {
            assert_eq!(frontier.orient(&r, d), 0);
            assert_eq!(frontier.axis_squared_distance(&r, d), 0.0);
        }
        assert_eq!(frontier.squared_distance(&r), 0.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "frontier entry read before init")]
    fn uninitialised_entry_is_caught_in_debug_builds() {
        let mut frontier = FrontierPool::new(2).unwrap();
        let mut r = frontier.create_ref();
        frontier.create_into(&mut r);
        frontier.init(&r, RecordIndex(3), 0);
        frontier.node_index.set_quiet(&mut frontier.pool, &r, None);
        let _ = frontier.node_index(&r);
    }

    #[test]
    fn child_inherits_parent_state() {
        let mut frontier = FrontierPool::new(2).unwrap();
        let mut parent = frontier.create_ref();
        frontier.create_into(&mut parent);
        frontier.init(&parent, RecordIndex(0), 0);
        frontier.set_orient(&parent, 1, -1);
        frontier.set_axis_squared_distance(&parent, 1, 9.0);
        frontier.set_squared_distance(&parent, 9.0);
        frontier.set_is_point(&parent, true);

        let mut child = frontier.create_ref();
        frontier.create_into(&mut child);
        frontier.init_from_parent(&child, RecordIndex(1), 1, &parent);
        assert_eq!(frontier.node_index(&child), RecordIndex(1));
        assert_eq!(frontier.split_dim(&child), 1);
        assert!(!frontier.is_point(&child));
        assert_eq!(frontier.orient(&child, 1), -1);
        assert_eq!(frontier.axis_squared_distance(&child, 1), 9.0);
        assert_eq!(frontier.squared_distance(&child), 9.0);
        // Parent untouched.
        assert_eq!(frontier.node_index(&parent), RecordIndex(0));
        assert!(frontier.is_point(&parent));
    }

    #[test]
    fn comparator_reads_current_distance() {
        let mut frontier = FrontierPool::new(1).unwrap();
        let a = {
            let mut r = frontier.create_ref();
            frontier.create_into(&mut r);
            frontier.init(&r, RecordIndex(0), 0);
            frontier.set_squared_distance(&r, 1.0);
            r
        };
        let b = {
            let mut r = frontier.create_ref();
            frontier.create_into(&mut r);
            frontier.init(&r, RecordIndex(1), 0);
            frontier.set_squared_distance(&r, 2.0);
            r
        };
        let cmp = frontier.comparator();
        assert_eq!(cmp.compare(frontier.pool(), &a, &b), Ordering::Less);
        frontier.set_squared_distance(&a, 3.0);
        assert_eq!(cmp.compare(frontier.pool(), &a, &b), Ordering::Greater);
    }

    #[test]
    fn starts_with_default_capacity() {
        let frontier = FrontierPool::new(2).unwrap();
        assert_eq!(frontier.pool().capacity(), 50);
        assert_eq!(frontier.size(), 0);
    }
}
