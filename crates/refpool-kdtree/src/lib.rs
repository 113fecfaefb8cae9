//! Pool-backed k-d tree and incremental nearest-neighbor search.
//!
//! Points, tree nodes, and search frontier entries are all records in
//! [`refpool_arena`] pools. The tree is built once and then only read;
//! each [`IncrementalNearestNeighborSearch`] owns a private frontier pool
//! and priority queue, so repeated queries reuse the same memory.
//!
//! ```text
//! RealPointPool ──from_points──▶ KdTree (node pool)
//!                                   │ &KdTree, shared
//!                                   ▼
//!                 IncrementalNearestNeighborSearch
//!                 ├── FrontierPool (boxes and points)
//!                 └── RefPriorityQueue<FrontierEntry, ByDistance>
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frontier;
pub mod metrics;
pub mod point;
pub mod search;
pub mod tree;

pub use error::KdTreeError;
pub use frontier::{ByDistance, FrontierEntry, FrontierPool};
pub use metrics::SearchMetrics;
pub use point::{PointView, RealPoint, RealPointPool};
pub use search::{IncrementalNearestNeighborSearch, Neighbor};
pub use tree::{KdTree, KdTreeNode};
