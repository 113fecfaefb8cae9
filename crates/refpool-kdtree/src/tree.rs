//! Balanced k-d tree stored in a record pool.
//!
//! Every node is one record of the node pool:
//!
//! ```text
//! position[n] : f64    coordinates of the node's point
//! data_index  : index  record index of the point in the source data
//! left        : index  left child, or none
//! right       : index  right child, or none
//! split_dim   : i32    dimension split at this node
//! ```
//!
//! Construction is a median split: the node at depth `k` splits on
//! dimension `k % n`. Everything in the left subtree is `<=` the node's
//! coordinate on that dimension and everything in the right subtree is
//! `>=`. The tree is immutable once built, so any number of searches may
//! read it concurrently.

use refpool_arena::{
    DoubleArrayAttribute, IndexAttribute, IntAttribute, Layout, Pool, PoolObject, Ref,
};
use refpool_core::{Coord, RealLocalizable, RecordIndex};
use smallvec::smallvec;

use crate::error::KdTreeError;
use crate::point::RealPointPool;

/// Record kind for tree nodes.
pub struct KdTreeNode;

impl PoolObject for KdTreeNode {
    // Nodes are written once, field by field, during construction.
    fn set_to_uninitialized_state(_record: &mut [u8]) {}
}

#[derive(Clone, Copy)]
struct NodeAttributes {
    position: DoubleArrayAttribute<KdTreeNode>,
    data_index: IndexAttribute<KdTreeNode>,
    left: IndexAttribute<KdTreeNode>,
    right: IndexAttribute<KdTreeNode>,
    split_dim: IntAttribute<KdTreeNode>,
}

/// A point waiting to be placed in the tree.
struct Pending {
    data_index: RecordIndex,
    position: Coord,
}

/// A balanced k-d tree over `n`-dimensional points.
pub struct KdTree {
    n: usize,
    nodes: Pool<KdTreeNode>,
    attrs: NodeAttributes,
    root: Option<RecordIndex>,
    min: Coord,
    max: Coord,
}

impl KdTree {
    /// Build a tree from `(data_index, position)` pairs.
    ///
    /// `data_index` is opaque to the tree; it is handed back by
    /// [`data_index`](Self::data_index) so callers can find the source
    /// record of a node.
    pub fn build<P, I>(num_dimensions: usize, points: I) -> Result<Self, KdTreeError>
    where
        P: RealLocalizable,
        I: IntoIterator<Item = (RecordIndex, P)>,
    {
        if num_dimensions == 0 {
            return Err(KdTreeError::ZeroDimensions);
        }
        let mut pending = Vec::new();
        for (data_index, p) in points {
            if p.num_dimensions() != num_dimensions {
                return Err(KdTreeError::DimensionMismatch {
                    expected: num_dimensions,
                    found: p.num_dimensions(),
                });
            }
            let mut position: Coord = smallvec![0.0; num_dimensions];
            p.localize(&mut position);
            pending.push(Pending {
                data_index,
                position,
            });
        }
        if pending.len() > i32::MAX as usize {
            return Err(KdTreeError::TooManyPoints {
                count: pending.len(),
            });
        }

        let mut b = Layout::builder();
        let position = b.double_array_field("position", num_dimensions);
        let data_index = b.index_field("data_index");
        let left = b.index_field("left");
        let right = b.index_field("right");
        let split_dim = b.int_field("split_dim");
        let nodes: Pool<KdTreeNode> = Pool::with_capacity(b.build()?, pending.len() as u32)?;
        let attrs = NodeAttributes {
            position: DoubleArrayAttribute::new(position, &nodes),
            data_index: IndexAttribute::new(data_index, &nodes),
            left: IndexAttribute::new(left, &nodes),
            right: IndexAttribute::new(right, &nodes),
            split_dim: IntAttribute::new(split_dim, &nodes),
        };

        let (min, max) = extent(num_dimensions, &pending);
        let mut tree = Self {
            n: num_dimensions,
            nodes,
            attrs,
            root: None,
            min,
            max,
        };
        tree.root = tree.build_subtree(&mut pending, 0)?;
        Ok(tree)
    }

    /// Build a tree over every live point of `points`, using each point's
    /// record index as its data index.
    pub fn from_points(points: &RealPointPool) -> Result<Self, KdTreeError> {
        let n = points.num_dimensions();
        let mut pending = Vec::with_capacity(points.size());
        let mut cursor = points.cursor();
        let mut r = points.create_ref();
        while cursor.advance(points.pool(), &mut r) {
            let position: Coord = (0..n).map(|d| points.position(&r, d)).collect();
            pending.push((r.index(), position));
        }
        Self::build(n, pending)
    }

    fn build_subtree(
        &mut self,
        items: &mut [Pending],
        depth: usize,
    ) -> Result<Option<RecordIndex>, KdTreeError> {
        if items.is_empty() {
            return Ok(None);
        }
        let d = depth % self.n;
        let mid = items.len() / 2;
        items.select_nth_unstable_by(mid, |a, b| a.position[d].total_cmp(&b.position[d]));

        let mut node = self.nodes.create_ref();
        let index = self.nodes.try_create_into(&mut node)?;
        let attrs = self.attrs;
        attrs
            .position
            .set_all_quiet(&mut self.nodes, &node, &items[mid].position);
        // Always Some; data_index() relies on it.
        attrs
            .data_index
            .set_quiet(&mut self.nodes, &node, Some(items[mid].data_index));
        attrs.split_dim.set_quiet(&mut self.nodes, &node, d as i32);

        let (lower, rest) = items.split_at_mut(mid);
        let upper = &mut rest[1..];
        let left = self.build_subtree(lower, depth + 1)?;
        let right = self.build_subtree(upper, depth + 1)?;
        attrs.left.set_quiet(&mut self.nodes, &node, left);
        attrs.right.set_quiet(&mut self.nodes, &node, right);
        Ok(Some(index))
    }

    /// Dimensionality of the tree.
    pub fn num_dimensions(&self) -> usize {
        self.n
    }

    /// Number of nodes (one per point).
    pub fn size(&self) -> usize {
        self.nodes.size()
    }

    /// Whether the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Record index of the root node, or `None` for an empty tree.
    pub fn root_index(&self) -> Option<RecordIndex> {
        self.root
    }

    /// The node pool.
    pub fn nodes(&self) -> &Pool<KdTreeNode> {
        &self.nodes
    }

    /// An unpointed node reference.
    pub fn create_ref(&self) -> Ref<KdTreeNode> {
        self.nodes.create_ref()
    }

    /// Repoint `node` at the node with record index `index`.
    pub fn get_object(&self, index: RecordIndex, node: &mut Ref<KdTreeNode>) {
        self.nodes.get_object(index, node);
    }

    /// Left child of `node`.
    pub fn left_index(&self, node: &Ref<KdTreeNode>) -> Option<RecordIndex> {
        self.attrs.left.get(&self.nodes, node)
    }

    /// Right child of `node`.
    pub fn right_index(&self, node: &Ref<KdTreeNode>) -> Option<RecordIndex> {
        self.attrs.right.get(&self.nodes, node)
    }

    /// Dimension `node` splits on.
    pub fn split_dimension(&self, node: &Ref<KdTreeNode>) -> usize {
        self.attrs.split_dim.get(&self.nodes, node) as usize
    }

    /// Coordinate `d` of `node`'s point.
    pub fn position(&self, node: &Ref<KdTreeNode>, d: usize) -> f64 {
        self.attrs.position.get(&self.nodes, node, d)
    }

    /// Data index stored with `node`.
    pub fn data_index(&self, node: &Ref<KdTreeNode>) -> RecordIndex {
        let index = self.attrs.data_index.get(&self.nodes, node);
        debug_assert!(index.is_some(), "tree node without a data index");
        index.unwrap_or(RecordIndex(0))
    }

    /// Squared Euclidean distance from `node`'s point to `p`.
    pub fn squared_distance_to(&self, node: &Ref<KdTreeNode>, p: &[f64]) -> f64 {
        (0..self.n)
            .map(|d| {
                let diff = self.position(node, d) - p[d];
                diff * diff
            })
            .sum()
    }

    /// Smallest coordinate on dimension `d` over all points.
    ///
    /// `+inf` for an empty tree.
    pub fn real_min(&self, d: usize) -> f64 {
        self.min[d]
    }

    /// Largest coordinate on dimension `d` over all points.
    ///
    /// `-inf` for an empty tree.
    pub fn real_max(&self, d: usize) -> f64 {
        self.max[d]
    }
}

fn extent(n: usize, points: &[Pending]) -> (Coord, Coord) {
    let mut min: Coord = smallvec![f64::INFINITY; n];
    let mut max: Coord = smallvec![f64::NEG_INFINITY; n];
    for p in points {
        for d in 0..n {
            min[d] = min[d].min(p.position[d]);
            max[d] = max[d].max(p.position[d]);
        }
    }
    (min, max)
}
