//! Off-heap record pools with flyweight references.
//!
//! Objects of one kind are stored as fixed-layout records in contiguous
//! byte storage owned by a [`Pool`]. Client code never holds the objects
//! themselves, only [`Ref`]s: small repointable handles that name a
//! record index. Typed [`Attribute`]s read and write record bytes in place.
//!
//! # Architecture
//!
//! ```text
//! Layout (attribute name → offset/size/kind, IndexMap)
//!   └── Field<T> / ArrayField<T>   typed descriptors from the builder
//!
//! Pool<K>
//! ├── RecordStorage → Segment[]    single array or fixed segments
//! ├── free list + generations      reuse before growth, stale detection
//! └── listeners                    notified by Attribute::set
//!
//! Ref<K>                           pool id + index + generation
//! RefList<K>, RefPriorityQueue<K>  collections of indices, not objects
//! PropertyMap<K, T>                heap side table keyed by record
//! ```
//!
//! # Ownership
//!
//! A pool is an ordinary value. Reads take `&Pool<K>`, and everything that
//! writes record bytes or changes occupancy takes `&mut Pool<K>`. A pool
//! built once and then only read can be shared across threads behind `&`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod attribute;
pub mod collection;
pub mod config;
pub mod handle;
pub mod iter;
pub mod layout;
pub mod pool;
pub mod property;
pub mod segment;

// Public re-exports for the primary API surface.
pub use attribute::{
    ArrayAttribute, Attribute, AttributeChange, AttributeListener, BooleanAttribute,
    ByteArrayAttribute, ByteAttribute, DoubleArrayAttribute, DoubleAttribute, FloatAttribute,
    IndexAttribute, IntArrayAttribute, IntAttribute, LongAttribute, Scalar,
};
pub use collection::{RefComparator, RefList, RefPriorityQueue};
pub use config::{PoolConfig, StorageMode};
pub use handle::Ref;
pub use iter::{PoolCursor, PoolIter};
pub use layout::{
    ArrayField, AttributeDef, AttributeKind, AttributeSpec, Field, Layout, LayoutBuilder,
    LayoutId, ScalarKind,
};
pub use pool::{Pool, PoolObject, PoolStats};
pub use property::{DoublePropertyMap, IntPropertyMap, PropertyMap};
