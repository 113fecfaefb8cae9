//! Benchmark profiles for the refpool framework.
//!
//! - [`reference_profile`]: 10K points in 3-D with 256 queries
//! - [`stress_profile`]: 100K points in 3-D with 256 queries
//!
//! Both are deterministic for a given seed.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use refpool_core::Coord;
use refpool_kdtree::{KdTree, KdTreeError};
use refpool_test_utils::{indexed, random_points};

/// A point set, a batch of queries, and the tree over the points.
pub struct SearchProfile {
    /// Dimensionality of points and queries.
    pub n: usize,
    /// Indexed points; data index `i` is `points[i]`.
    pub points: Vec<Coord>,
    /// Query points, drawn from the same distribution as `points`.
    pub queries: Vec<Coord>,
    /// Tree built over `points`.
    pub tree: KdTree,
}

/// Build a profile of `count` points in `n` dimensions.
pub fn profile(
    seed: u64,
    count: usize,
    n: usize,
    queries: usize,
) -> Result<SearchProfile, KdTreeError> {
    let points = random_points(seed, count, n, 100.0);
    let queries = random_points(seed ^ 0x9e37_79b9_7f4a_7c15, queries, n, 100.0);
    let tree = KdTree::build(n, indexed(&points))?;
    Ok(SearchProfile {
        n,
        points,
        queries,
        tree,
    })
}

/// 10K points in 3-D.
pub fn reference_profile(seed: u64) -> Result<SearchProfile, KdTreeError> {
    profile(seed, 10_000, 3, 256)
}

/// 100K points in 3-D.
pub fn stress_profile(seed: u64) -> Result<SearchProfile, KdTreeError> {
    profile(seed, 100_000, 3, 256)
}
