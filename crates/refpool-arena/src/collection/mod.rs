//! Collections of references that store record indices, not objects.
//!
//! Both collections hold indices (plus validation metadata) into one
//! pool and repoint caller-owned references on access, so filling and
//! draining them allocates nothing once their backing `Vec` has grown.

pub mod list;
pub mod queue;

pub use list::RefList;
pub use queue::{RefComparator, RefPriorityQueue};
