//! Test utilities for refpool development.
//!
//! Seeded point generators and a brute-force nearest-neighbor oracle to
//! cross-check the k-d tree search against, plus small fixed fixtures.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use refpool_core::{Coord, RealLocalizable, RecordIndex};

/// Generate `count` points in `n` dimensions, uniform in `[-scale, scale)`.
///
/// Deterministic for a given seed.
pub fn random_points(seed: u64, count: usize, n: usize, scale: f64) -> Vec<Coord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| random_coord(&mut rng, n, scale)).collect()
}

/// One uniform point in `[-scale, scale)^n`.
pub fn random_coord(rng: &mut ChaCha8Rng, n: usize, scale: f64) -> Coord {
    (0..n)
        .map(|_| (rng.gen::<f64>() * 2.0 - 1.0) * scale)
        .collect()
}

/// Generate points on a coarse integer grid so that exact distance ties
/// are common.
pub fn grid_points(seed: u64, count: usize, n: usize, cells: i32) -> Vec<Coord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..n).map(|_| rng.gen_range(0..cells) as f64).collect())
        .collect()
}

/// Squared Euclidean distance between two points.
pub fn squared_distance(a: &impl RealLocalizable, b: &impl RealLocalizable) -> f64 {
    (0..a.num_dimensions())
        .map(|d| {
            let diff = a.position(d) - b.position(d);
            diff * diff
        })
        .sum()
}

/// Every point as `(index in points, squared distance to query)`,
/// sorted by distance.
pub fn brute_force_sorted(
    points: &[Coord],
    query: &impl RealLocalizable,
) -> Vec<(RecordIndex, f64)> {
    let mut all: Vec<(RecordIndex, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (RecordIndex(i as u32), squared_distance(p, query)))
        .collect();
    all.sort_by(|a, b| a.1.total_cmp(&b.1));
    all
}

/// Squared distance from `query` to its nearest point, or `None` for an
/// empty set.
pub fn brute_force_nearest(points: &[Coord], query: &impl RealLocalizable) -> Option<f64> {
    points
        .iter()
        .map(|p| squared_distance(p, query))
        .min_by(f64::total_cmp)
}

/// Points tagged with their position in the slice, ready for
/// `KdTree::build`.
pub fn indexed(points: &[Coord]) -> impl Iterator<Item = (RecordIndex, &Coord)> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (RecordIndex(i as u32), p))
}
