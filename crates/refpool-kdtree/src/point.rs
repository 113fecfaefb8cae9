//! Pool of real-valued points.
//!
//! Each record holds one `double[n]` position. The pool is the usual
//! source of data for [`KdTree::from_points`](crate::tree::KdTree::from_points):
//! tree nodes store the point's record index as their data index.

use refpool_arena::{DoubleArrayAttribute, Layout, Pool, PoolCursor, PoolObject, Ref};
use refpool_core::{RealLocalizable, RecordIndex};

use crate::error::KdTreeError;

/// Record kind for points.
pub struct RealPoint;

impl PoolObject for RealPoint {
    // `init` writes the whole position.
    fn set_to_uninitialized_state(_record: &mut [u8]) {}
}

/// A pool of `n`-dimensional points.
pub struct RealPointPool {
    n: usize,
    pool: Pool<RealPoint>,
    position: DoubleArrayAttribute<RealPoint>,
}

impl RealPointPool {
    /// Create a pool of `num_dimensions`-dimensional points with room for
    /// `initial_capacity` of them.
    pub fn new(num_dimensions: usize, initial_capacity: u32) -> Result<Self, KdTreeError> {
        if num_dimensions == 0 {
            return Err(KdTreeError::ZeroDimensions);
        }
        let mut b = Layout::builder();
        let position = b.double_array_field("position", num_dimensions);
        let pool = Pool::with_capacity(b.build()?, initial_capacity)?;
        let position = DoubleArrayAttribute::new(position, &pool);
        Ok(Self {
            n: num_dimensions,
            pool,
            position,
        })
    }

    /// Dimensionality of every point in this pool.
    pub fn num_dimensions(&self) -> usize {
        self.n
    }

    /// Number of live points.
    pub fn size(&self) -> usize {
        self.pool.size()
    }

    /// The underlying record pool.
    pub fn pool(&self) -> &Pool<RealPoint> {
        &self.pool
    }

    /// An unpointed reference.
    pub fn create_ref(&self) -> Ref<RealPoint> {
        self.pool.create_ref()
    }

    /// Add a point at `position` and return a reference to it.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `position` has the wrong dimensionality.
    pub fn add(&mut self, position: impl RealLocalizable) -> Ref<RealPoint> {
        let mut r = self.pool.create_ref();
        self.add_into(position, &mut r);
        r
    }

    /// Add a point at `position`, repointing `r` at it.
    pub fn add_into(
        &mut self,
        position: impl RealLocalizable,
        r: &mut Ref<RealPoint>,
    ) -> RecordIndex {
        let index = self.pool.create_into(r);
        self.init(r, position);
        index
    }

    /// Overwrite the position of the point `r` points at.
    pub fn init(&mut self, r: &Ref<RealPoint>, position: impl RealLocalizable) {
        debug_assert_eq!(
            position.num_dimensions(),
            self.n,
            "point dimensionality mismatch"
        );
        for d in 0..self.n {
            self.position
                .set_quiet(&mut self.pool, r, d, position.position(d));
        }
    }

    /// Remove the point `r` points at.
    pub fn delete(&mut self, r: &Ref<RealPoint>) {
        self.pool.delete(r);
    }

    /// Repoint `r` at the point with record index `index`.
    pub fn get_object(&self, index: RecordIndex, r: &mut Ref<RealPoint>) {
        self.pool.get_object(index, r);
    }

    /// Coordinate `d` of the point `r` points at.
    pub fn position(&self, r: &Ref<RealPoint>, d: usize) -> f64 {
        self.position.get(&self.pool, r, d)
    }

    /// Borrow the point `r` points at as a [`RealLocalizable`].
    pub fn view<'a>(&'a self, r: &'a Ref<RealPoint>) -> PointView<'a> {
        PointView { points: self, r }
    }

    /// Walk all live points with one caller-owned reference.
    pub fn cursor(&self) -> PoolCursor {
        self.pool.cursor()
    }

    /// Format the point `r` points at as `( x, y, ... )`.
    pub fn describe(&self, r: &Ref<RealPoint>) -> String {
        let coords: Vec<String> = (0..self.n).map(|d| self.position(r, d).to_string()).collect();
        format!("( {} )", coords.join(", "))
    }
}

/// A borrowed point record, readable as coordinates.
#[derive(Clone, Copy)]
pub struct PointView<'a> {
    points: &'a RealPointPool,
    r: &'a Ref<RealPoint>,
}

impl RealLocalizable for PointView<'_> {
    fn num_dimensions(&self) -> usize {
        self.points.n
    }

    fn position(&self, d: usize) -> f64 {
        self.points.position(self.r, d)
    }
}
