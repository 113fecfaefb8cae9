//! Incremental nearest-neighbor search on a [`KdTree`].
//!
//! Best-first branch and bound. The frontier holds boxes (subtrees not yet
//! opened) and points (nodes whose own coordinate has been measured),
//! ordered by squared distance to the query. Popping a box opens it into
//! one box per child plus a point for the node itself; popping a point
//! yields it. Because a box's distance is a lower bound on every point
//! inside it, points come out in non-decreasing distance order.
//!
//! Box bounds are maintained incrementally. A child starts as a copy of
//! its parent's per-axis state and changes only on the parent's split
//! axis `d`, with `axis_diff = node[d] - query[d]`:
//!
//! - left child (coordinates `<= node[d]`): if the query is already above
//!   the parent box on `d`, or `axis_diff <= 0`, the query lies at or
//!   above the child box, so orient becomes `1` and the gap `axis_diff²`.
//! - right child (coordinates `>= node[d]`): symmetric, with
//!   `axis_diff > 0` and orient `-1`.
//!
//! Otherwise the query projects into the child's span on `d` and the
//! inherited contribution stands.
//!
//! All frontier state lives in a [`FrontierPool`] owned by the search, so
//! after the first few queries a search allocates nothing. Share the tree
//! between threads and give each thread its own search.

use refpool_arena::{Ref, RefPriorityQueue};
use refpool_core::{Coord, RealLocalizable, RecordIndex};
use smallvec::smallvec;

use crate::error::KdTreeError;
use crate::frontier::{ByDistance, FrontierEntry, FrontierPool};
use crate::metrics::SearchMetrics;
use crate::tree::{KdTree, KdTreeNode};

/// One neighbor produced by a search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Record index of the tree node.
    pub node_index: RecordIndex,
    /// Data index stored with the node.
    pub data_index: RecordIndex,
    /// Exact squared Euclidean distance to the query.
    pub squared_distance: f64,
}

impl Neighbor {
    /// Euclidean distance to the query.
    pub fn distance(&self) -> f64 {
        self.squared_distance.sqrt()
    }
}

/// Incremental nearest-neighbor search over one tree.
///
/// Call [`search`](Self::search) with a query, then pull neighbors with
/// [`Iterator::next`]. Each `search` starts over; neighbors not yet pulled
/// from the previous query are discarded. Stopping early is free: the
/// rest of the tree is never visited.
pub struct IncrementalNearestNeighborSearch<'t> {
    tree: &'t KdTree,
    n: usize,
    query: Coord,
    frontier: FrontierPool,
    queue: RefPriorityQueue<FrontierEntry, ByDistance>,
    node: Ref<KdTreeNode>,
    current: Ref<FrontierEntry>,
    child: Ref<FrontierEntry>,
    neighbor: Option<Neighbor>,
    metrics: SearchMetrics,
}

impl<'t> IncrementalNearestNeighborSearch<'t> {
    /// Create a search over `tree`.
    pub fn new(tree: &'t KdTree) -> Result<Self, KdTreeError> {
        let n = tree.num_dimensions();
        let frontier = FrontierPool::new(n)?;
        let queue = RefPriorityQueue::new(frontier.comparator());
        Ok(Self {
            tree,
            n,
            query: smallvec![0.0; n],
            node: tree.create_ref(),
            current: frontier.create_ref(),
            child: frontier.create_ref(),
            frontier,
            queue,
            neighbor: None,
            metrics: SearchMetrics::default(),
        })
    }

    /// Dimensionality of the tree being searched.
    pub fn num_dimensions(&self) -> usize {
        self.n
    }

    /// Start a new search for `query`.
    ///
    /// Discards all state from the previous search. On an empty tree the
    /// search succeeds and yields nothing.
    pub fn search(&mut self, query: impl RealLocalizable) -> Result<(), KdTreeError> {
        if query.num_dimensions() != self.n {
            return Err(KdTreeError::DimensionMismatch {
                expected: self.n,
                found: query.num_dimensions(),
            });
        }
        self.queue.clear();
        self.frontier.clear();
        self.neighbor = None;
        self.metrics = SearchMetrics::default();
        query.localize(&mut self.query);

        let Some(root) = self.tree.root_index() else {
            return Ok(());
        };

        self.frontier.create_into(&mut self.current);
        self.frontier.init(&self.current, root, 0);
        let mut sq_distance = 0.0;
        for d in 0..self.n {
            let q = self.query[d];
            let below = self.tree.real_min(d) - q;
            if below > 0.0 {
                self.set_axis(d, -1, below);
                sq_distance += below * below;
                continue;
            }
            let above = q - self.tree.real_max(d);
            if above >= 0.0 {
                self.set_axis(d, 1, above);
                sq_distance += above * above;
            }
        }
        self.frontier
            .set_squared_distance(&self.current, sq_distance);
        self.offer_current();
        self.metrics.entries_created += 1;
        self.metrics.frontier_capacity = self.frontier.pool().capacity();
        Ok(())
    }

    fn set_axis(&mut self, d: usize, orient: i8, gap: f64) {
        self.frontier.set_orient(&self.current, d, orient);
        self.frontier
            .set_axis_squared_distance(&self.current, d, gap * gap);
    }

    fn offer_current(&mut self) {
        self.queue.offer(self.frontier.pool(), &self.current);
        self.note_queue_len();
    }

    fn offer_child(&mut self) {
        self.queue.offer(self.frontier.pool(), &self.child);
        self.note_queue_len();
        self.metrics.entries_created += 1;
    }

    fn note_queue_len(&mut self) {
        self.metrics.peak_queue_len = self.metrics.peak_queue_len.max(self.queue.len());
    }

    /// Whether another neighbor is available.
    pub fn has_next(&self) -> bool {
        // Every queued box eventually turns into at least one point.
        !self.queue.is_empty()
    }

    /// Advance to the next nearest neighbor.
    ///
    /// Returns `None` once every point has been yielded.
    pub fn fwd(&mut self) -> Option<Neighbor> {
        let tree = self.tree;
        while self.queue.poll_into(self.frontier.pool(), &mut self.current) {
            let node_index = self.frontier.node_index(&self.current);

            if self.frontier.is_point(&self.current) {
                tree.get_object(node_index, &mut self.node);
                let neighbor = Neighbor {
                    node_index,
                    data_index: tree.data_index(&self.node),
                    squared_distance: self.frontier.squared_distance(&self.current),
                };
                self.frontier.delete(&self.current);
                self.neighbor = Some(neighbor);
                self.metrics.points_yielded += 1;
                self.metrics.frontier_capacity = self.frontier.pool().capacity();
                return Some(neighbor);
            }

            self.expand(node_index);
        }
        self.neighbor = None;
        None
    }

    /// Open the box `current` into its children and its own point.
    fn expand(&mut self, node_index: RecordIndex) {
        let tree = self.tree;
        tree.get_object(node_index, &mut self.node);
        self.metrics.nodes_expanded += 1;

        let d = self.frontier.split_dim(&self.current);
        let child_dim = (d + 1) % self.n;
        let axis_diff = tree.position(&self.node, d) - self.query[d];

        if let Some(left) = tree.left_index(&self.node) {
            self.frontier.create_into(&mut self.child);
            self.frontier
                .init_from_parent(&self.child, left, child_dim, &self.current);
            let o = self.frontier.orient(&self.child, d);
            if o > 0 || axis_diff <= 0.0 {
                self.tighten_child(d, o, 1, axis_diff);
            }
            self.offer_child();
        }

        if let Some(right) = tree.right_index(&self.node) {
            self.frontier.create_into(&mut self.child);
            self.frontier
                .init_from_parent(&self.child, right, child_dim, &self.current);
            let o = self.frontier.orient(&self.child, d);
            if o < 0 || axis_diff > 0.0 {
                self.tighten_child(d, o, -1, axis_diff);
            }
            self.offer_child();
        }

        let exact = tree.squared_distance_to(&self.node, &self.query);
        self.frontier.set_is_point(&self.current, true);
        self.frontier.set_squared_distance(&self.current, exact);
        self.offer_current();
    }

    /// Replace the child's contribution on `d` with `axis_diff²`, keeping
    /// its total in step. Orientation changes only if the child was inside
    /// on `d`.
    fn tighten_child(&mut self, d: usize, inherited: i8, orient: i8, axis_diff: f64) {
        if inherited == 0 {
            self.frontier.set_orient(&self.child, d, orient);
        }
        let gap = axis_diff * axis_diff;
        let previous = self.frontier.axis_squared_distance(&self.current, d);
        let total = self.frontier.squared_distance(&self.child) - previous + gap;
        self.frontier.set_axis_squared_distance(&self.child, d, gap);
        self.frontier.set_squared_distance(&self.child, total);
    }

    /// The most recently yielded neighbor.
    pub fn current(&self) -> Option<&Neighbor> {
        self.neighbor.as_ref()
    }

    /// Squared distance from the query to the current neighbor.
    pub fn squared_distance(&self) -> Option<f64> {
        self.neighbor.map(|nb| nb.squared_distance)
    }

    /// Distance from the query to the current neighbor.
    pub fn distance(&self) -> Option<f64> {
        self.neighbor.map(|nb| nb.distance())
    }

    /// Tree node of the current neighbor.
    pub fn node_index(&self) -> Option<RecordIndex> {
        self.neighbor.map(|nb| nb.node_index)
    }

    /// Data index of the current neighbor.
    pub fn data_index(&self) -> Option<RecordIndex> {
        self.neighbor.map(|nb| nb.data_index)
    }

    /// Coordinate `d` of the current neighbor.
    pub fn position(&self, d: usize) -> Option<f64> {
        let nb = self.neighbor?;
        let mut node = self.tree.create_ref();
        self.tree.get_object(nb.node_index, &mut node);
        Some(self.tree.position(&node, d))
    }

    /// Run a search for `query` to exhaustion and collect every neighbor.
    pub fn search_all(
        &mut self,
        query: impl RealLocalizable,
    ) -> Result<Vec<Neighbor>, KdTreeError> {
        self.search(query)?;
        Ok(self.by_ref().collect())
    }

    /// Counters for the current search.
    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }
}

impl Iterator for IncrementalNearestNeighborSearch<'_> {
    type Item = Neighbor;

    fn next(&mut self) -> Option<Neighbor> {
        self.fwd()
    }
}
