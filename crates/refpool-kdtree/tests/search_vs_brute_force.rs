//! Integration test: incremental search against a brute-force scan.
//!
//! For seeded random point sets the search must produce every point
//! exactly once, in non-decreasing distance order, with each reported
//! squared distance equal to the one computed directly from coordinates.

use proptest::prelude::*;
use refpool_core::{Coord, RecordIndex};
use refpool_kdtree::{IncrementalNearestNeighborSearch, KdTree, Neighbor};
use refpool_test_utils::fixtures::{point_pool, square_points, tree};
use refpool_test_utils::{
    brute_force_nearest, brute_force_sorted, grid_points, random_coord, random_points,
    squared_distance,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn check_full_drain(n: usize, points: &[Coord], query: &Coord) -> Vec<Neighbor> {
    let tree = tree(n, points).unwrap();
    let mut search = IncrementalNearestNeighborSearch::new(&tree).unwrap();
    let found = search.search_all(query).unwrap();

    assert_eq!(found.len(), points.len());
    for pair in found.windows(2) {
        assert!(pair[0].squared_distance <= pair[1].squared_distance);
    }
    for nb in &found {
        let p = &points[nb.data_index.as_usize()];
        assert_eq!(nb.squared_distance, squared_distance(p, query));
    }
    let mut seen: Vec<u32> = found.iter().map(|nb| nb.data_index.0).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), points.len());

    // Distances match the brute-force ordering position by position.
    let expected = brute_force_sorted(points, query);
    for (nb, (_, sq)) in found.iter().zip(&expected) {
        assert_eq!(nb.squared_distance, *sq);
    }
    found
}

#[test]
fn square_scenario() {
    let points = square_points();
    let query: Coord = [1.0, 1.0].into_iter().collect();
    let found = check_full_drain(2, &points, &query);

    assert_eq!(found[0].data_index, RecordIndex(0));
    assert_eq!(found[0].distance(), 2f64.sqrt());
    // (5,5) is the only point at distance sqrt(32).
    assert_eq!(found[1].data_index, RecordIndex(1));
    assert_eq!(found[1].distance(), 32f64.sqrt());
}

#[test]
fn random_sets_in_several_dimensions() {
    for (seed, n) in [(1, 2), (2, 3), (3, 4), (4, 6)] {
        let points = random_points(seed, 2_000, n, 50.0);
        let mut rng = ChaCha8Rng::seed_from_u64(seed + 100);
        for _ in 0..5 {
            let query = random_coord(&mut rng, n, 80.0);
            check_full_drain(n, &points, &query);
        }
    }
}

#[test]
fn first_neighbor_on_ten_thousand_points() {
    let points = random_points(11, 10_000, 3, 100.0);
    let tree = tree(3, &points).unwrap();
    let mut search = IncrementalNearestNeighborSearch::new(&tree).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    for _ in 0..50 {
        let query = random_coord(&mut rng, 3, 120.0);
        search.search(&query).unwrap();
        let first = search.next().unwrap();
        assert_eq!(Some(first.squared_distance), brute_force_nearest(&points, &query));
        // Only a small part of the tree is opened for one neighbor.
        assert!(search.metrics().nodes_expanded < 10_000);
    }
}

#[test]
fn heavy_ties_on_a_grid() {
    let points = grid_points(5, 500, 2, 6);
    let query: Coord = [2.0, 3.0].into_iter().collect();
    let found = check_full_drain(2, &points, &query);
    let coincident = points.iter().filter(|p| squared_distance(*p, &query) == 0.0).count();
    let zero = found.iter().take_while(|nb| nb.squared_distance == 0.0).count();
    assert_eq!(zero, coincident);
}

#[test]
fn repeated_searches_are_identical() {
    let points = random_points(21, 1_000, 3, 10.0);
    let tree = tree(3, &points).unwrap();
    let mut search = IncrementalNearestNeighborSearch::new(&tree).unwrap();
    let query = points[17].clone();
    let first = search.search_all(&query).unwrap();
    let second = search.search_all(&query).unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].data_index, RecordIndex(17));
    assert_eq!(first[0].squared_distance, 0.0);
}

#[test]
fn partial_drain_then_new_query() {
    let points = random_points(31, 300, 2, 10.0);
    let tree = tree(2, &points).unwrap();
    let mut search = IncrementalNearestNeighborSearch::new(&tree).unwrap();

    let a: Coord = [0.0, 0.0].into_iter().collect();
    search.search(&a).unwrap();
    let _ = search.by_ref().take(7).count();

    let b: Coord = [5.0, -5.0].into_iter().collect();
    let after = search.search_all(&b).unwrap();
    let fresh = IncrementalNearestNeighborSearch::new(&tree)
        .unwrap()
        .search_all(&b)
        .unwrap();
    assert_eq!(after, fresh);
}

#[test]
fn tree_from_point_pool_matches_slice_tree() {
    let points = random_points(41, 400, 3, 10.0);
    let pool = point_pool(3, &points).unwrap();
    let from_pool = KdTree::from_points(&pool).unwrap();
    let query: Coord = [1.0, 2.0, 3.0].into_iter().collect();

    let mut search = IncrementalNearestNeighborSearch::new(&from_pool).unwrap();
    let found = search.search_all(&query).unwrap();
    let expected = brute_force_sorted(&points, &query);
    assert_eq!(found.len(), expected.len());
    for (nb, (_, sq)) in found.iter().zip(&expected) {
        assert_eq!(nb.squared_distance, *sq);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ordering_holds_for_arbitrary_sets(
        raw in prop::collection::vec(prop::collection::vec(-1e3f64..1e3, 3), 0..200),
        q in prop::collection::vec(-2e3f64..2e3, 3),
    ) {
        let points: Vec<Coord> = raw.into_iter().map(Coord::from_vec).collect();
        let query = Coord::from_vec(q);
        let tree = tree(3, &points).unwrap();
        let mut search = IncrementalNearestNeighborSearch::new(&tree).unwrap();
        let found = search.search_all(&query).unwrap();

        prop_assert_eq!(found.len(), points.len());
        for pair in found.windows(2) {
            prop_assert!(pair[0].squared_distance <= pair[1].squared_distance);
        }
        if let Some(first) = found.first() {
            prop_assert_eq!(Some(first.squared_distance), brute_force_nearest(&points, &query));
        }
    }
}
