//! Per-search counters for the incremental nearest-neighbor search.
//!
//! [`SearchMetrics`] is reset by every `search` call and updated as the
//! caller consumes neighbors, so after draining a search it describes the
//! whole traversal, and after a partial drain it describes only the work
//! done so far.

/// Counters collected during one search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchMetrics {
    /// Box entries popped and split into children.
    pub nodes_expanded: u64,
    /// Neighbors handed to the caller.
    pub points_yielded: u64,
    /// Frontier entries allocated, root included.
    pub entries_created: u64,
    /// Largest priority queue length seen.
    pub peak_queue_len: usize,
    /// Frontier records the pool has room for after the search.
    pub frontier_capacity: usize,
}
