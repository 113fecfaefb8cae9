//! Errors from building point pools and k-d trees.

use std::error::Error;
use std::fmt;

use refpool_core::{LayoutError, PoolError};

/// Errors from constructing a point pool, a k-d tree, or a search.
///
/// Searching an empty tree is not an error; it yields no neighbors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KdTreeError {
    /// A tree or pool was requested with zero dimensions.
    ZeroDimensions,
    /// A point's dimensionality does not match the tree's.
    DimensionMismatch {
        /// Dimensionality of the tree.
        expected: usize,
        /// Dimensionality of the offending point.
        found: usize,
    },
    /// More points than a record index can address.
    TooManyPoints {
        /// Number of points supplied.
        count: usize,
    },
    /// A record layout could not be built.
    Layout(LayoutError),
    /// A backing pool could not be created or grown.
    Pool(PoolError),
}

impl fmt::Display for KdTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimensions => write!(f, "k-d tree needs at least one dimension"),
            Self::DimensionMismatch { expected, found } => {
                write!(f, "point has {found} dimensions, tree has {expected}")
            }
            Self::TooManyPoints { count } => {
                write!(f, "{count} points exceed the record index range")
            }
            Self::Layout(e) => write!(f, "node layout: {e}"),
            Self::Pool(e) => write!(f, "node pool: {e}"),
        }
    }
}

impl Error for KdTreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            Self::Pool(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for KdTreeError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

impl From<PoolError> for KdTreeError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}
