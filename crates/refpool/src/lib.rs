//! Refpool: off-heap object pools with flyweight references.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! refpool sub-crates. For most users, adding `refpool` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use refpool::prelude::*;
//!
//! // Four points in the plane, stored in a pool.
//! let mut points = RealPointPool::new(2, 4).unwrap();
//! let mut r = points.create_ref();
//! for p in [[0.0, 0.0], [5.0, 5.0], [10.0, 0.0], [0.0, 10.0]] {
//!     points.add_into(p, &mut r);
//! }
//!
//! // Build a k-d tree and stream neighbors of (1, 1) nearest first.
//! let tree = KdTree::from_points(&points).unwrap();
//! let mut search = IncrementalNearestNeighborSearch::new(&tree).unwrap();
//! search.search([1.0, 1.0]).unwrap();
//!
//! let first = search.next().unwrap();
//! assert_eq!(first.data_index, RecordIndex(0));
//! assert_eq!(first.squared_distance, 2.0);
//!
//! let second = search.next().unwrap();
//! assert_eq!(second.squared_distance, 32.0);
//! assert_eq!(search.count(), 2);
//! ```
//!
//! # Crate organization
//!
//! | Module | Crate | Purpose |
//! |--------|-------|---------|
//! | [`types`] | `refpool-core` | Record indices, pool ids, coordinates, errors |
//! | [`arena`] | `refpool-arena` | Layouts, attributes, pools, references, collections |
//! | [`kdtree`] | `refpool-kdtree` | Point pools, k-d tree, incremental nearest-neighbor search |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types: [`types::RecordIndex`], [`types::PoolId`], [`types::Coord`],
/// the [`types::RealLocalizable`] trait and the layout/pool error enums.
pub use refpool_core as types;

/// Pool storage: [`arena::Layout`] construction, typed attribute accessors,
/// [`arena::Pool`] with its free list and listeners, flyweight
/// [`arena::Ref`] handles, and the pool-aware list and priority queue.
pub use refpool_arena as arena;

/// Spatial search: [`kdtree::RealPointPool`], the pool-backed
/// [`kdtree::KdTree`] and [`kdtree::IncrementalNearestNeighborSearch`].
pub use refpool_kdtree as kdtree;

/// Common imports for typical refpool usage.
///
/// ```rust
/// use refpool::prelude::*;
/// ```
///
/// This imports the most frequently used types: layouts and attributes,
/// pools and references, collections, and the k-d tree search.
pub mod prelude {
    // Core types and traits
    pub use refpool_core::{Coord, PoolId, RealLocalizable, RecordIndex};

    // Errors
    pub use refpool_core::{LayoutError, PoolError};
    pub use refpool_kdtree::KdTreeError;

    // Layouts and attributes
    pub use refpool_arena::{
        Attribute, BooleanAttribute, DoubleArrayAttribute, DoubleAttribute, IndexAttribute,
        IntAttribute, Layout, LayoutBuilder,
    };

    // Pools
    pub use refpool_arena::{Pool, PoolConfig, PoolObject, PoolStats, Ref, StorageMode};

    // Collections and side tables
    pub use refpool_arena::{PropertyMap, RefComparator, RefList, RefPriorityQueue};

    // Spatial search
    pub use refpool_kdtree::{
        IncrementalNearestNeighborSearch, KdTree, Neighbor, RealPointPool, SearchMetrics,
    };
}
