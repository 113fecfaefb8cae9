//! Error types for the refpool framework.
//!
//! Organised by subsystem: record layout definition and pool
//! construction/reference validation. Steady-state pool operations do
//! not return these errors; they surface at construction time or from
//! explicit validation calls.

use std::error::Error;
use std::fmt;

use crate::id::{PoolId, RecordIndex};

/// Errors from defining a record layout.
///
/// All layout errors are fatal: a layout is built once when a record kind
/// is defined and is immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Two attributes claim overlapping byte ranges.
    Overlap {
        /// Name of the attribute that starts first.
        first: String,
        /// Name of the attribute whose range begins inside `first`.
        second: String,
    },
    /// Attributes leave unclaimed bytes between them.
    Gap {
        /// Offset of the attribute that starts too late.
        offset: usize,
        /// Offset where the previous attribute ended.
        expected: usize,
    },
    /// Two attributes share a name.
    DuplicateName {
        /// The repeated name.
        name: String,
    },
    /// An array attribute was declared with zero elements.
    ZeroLengthArray {
        /// Name of the offending attribute.
        name: String,
    },
    /// The layout declares no attributes at all.
    Empty,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap { first, second } => {
                write!(f, "attribute '{second}' overlaps attribute '{first}'")
            }
            Self::Gap { offset, expected } => {
                write!(
                    f,
                    "layout gap: attribute starts at byte {offset}, expected {expected}"
                )
            }
            Self::DuplicateName { name } => write!(f, "duplicate attribute name '{name}'"),
            Self::ZeroLengthArray { name } => {
                write!(f, "array attribute '{name}' has zero elements")
            }
            Self::Empty => write!(f, "layout declares no attributes"),
        }
    }
}

impl Error for LayoutError {}

/// Errors from pool construction and reference validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// The pool configuration is invalid.
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
    /// The pool cannot grow to hold the requested number of records.
    CapacityExceeded {
        /// Number of records requested.
        requested: usize,
        /// Maximum number of records the pool may hold.
        max: usize,
    },
    /// A reference points at a record that was deleted (and possibly
    /// reused) after the reference was pointed at it.
    StaleReference {
        /// The record index the reference points at.
        index: RecordIndex,
        /// Generation recorded in the reference.
        expected_generation: u32,
        /// Current generation of the record slot.
        found_generation: u32,
    },
    /// A reference issued by a different pool.
    ForeignReference {
        /// This pool's id.
        expected: PoolId,
        /// The id stored in the reference.
        found: PoolId,
    },
    /// A reference that was never pointed at a record.
    Unpointed,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid pool config: {reason}"),
            Self::CapacityExceeded { requested, max } => {
                write!(
                    f,
                    "pool capacity exceeded: requested {requested} records, max {max}"
                )
            }
            Self::StaleReference {
                index,
                expected_generation,
                found_generation,
            } => {
                write!(
                    f,
                    "stale reference to record {index}: generation {expected_generation}, current {found_generation}"
                )
            }
            Self::ForeignReference { expected, found } => {
                write!(f, "reference from pool {found} used with pool {expected}")
            }
            Self::Unpointed => write!(f, "reference is not pointed at any record"),
        }
    }
}

impl Error for PoolError {}
