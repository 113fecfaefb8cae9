//! Small fixed point sets and builders shared by tests and benches.

use refpool_core::Coord;
use refpool_kdtree::{KdTree, KdTreeError, RealPointPool};
use smallvec::smallvec;

/// Three corners of a 10x10 square plus its centre:
/// `(0,0)`, `(5,5)`, `(10,0)`, `(0,10)`.
pub fn square_points() -> Vec<Coord> {
    vec![
        smallvec![0.0, 0.0],
        smallvec![5.0, 5.0],
        smallvec![10.0, 0.0],
        smallvec![0.0, 10.0],
    ]
}

/// A point pool holding `points` in order, so record index `i` is
/// `points[i]`.
pub fn point_pool(n: usize, points: &[Coord]) -> Result<RealPointPool, KdTreeError> {
    let mut pool = RealPointPool::new(n, points.len() as u32)?;
    let mut r = pool.create_ref();
    for p in points {
        pool.add_into(p, &mut r);
    }
    Ok(pool)
}

/// A tree over `points`, with data index `i` for `points[i]`.
pub fn tree(n: usize, points: &[Coord]) -> Result<KdTree, KdTreeError> {
    KdTree::build(n, crate::indexed(points))
}
