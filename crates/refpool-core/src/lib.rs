//! Core types and traits for the refpool object pool framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the refpool workspace:
//! record and pool identifiers, error types, and coordinate traits.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::{LayoutError, PoolError};
pub use id::{Coord, PoolId, RecordIndex};
pub use traits::RealLocalizable;
