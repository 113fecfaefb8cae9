//! Typed accessors over record bytes.
//!
//! An [`Attribute`] binds a layout [`Field`] to one pool. Reading or
//! writing through it touches `record_bytes[offset..offset + size]` of the
//! record a [`Ref`] points at, with no intermediate objects.
//!
//! Every attribute has two write paths:
//!
//! - `set` notifies the pool's [`AttributeListener`]s before writing, so
//!   observers (undo stacks, change trackers) see the previous bytes.
//! - `set_quiet` writes without notification. Hot paths that own their
//!   records outright (search frontiers, tree construction) use this one.

use std::marker::PhantomData;

use refpool_core::RecordIndex;

use crate::handle::Ref;
use crate::layout::{ArrayField, Field, ScalarKind};
use crate::pool::{Pool, PoolObject};

/// A fixed-size value that can be stored in a record.
///
/// All multi-byte values are stored little-endian.
pub trait Scalar: Copy + 'static {
    /// The layout kind this type maps to.
    const KIND: ScalarKind;
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Decode from the first [`SIZE`](Self::SIZE) bytes of `bytes`.
    fn read(bytes: &[u8]) -> Self;

    /// Encode into the first [`SIZE`](Self::SIZE) bytes of `bytes`.
    fn write(self, bytes: &mut [u8]);
}

#[inline]
fn take<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes[..N]);
    buf
}

macro_rules! le_scalar {
    ($ty:ty, $kind:expr) => {
        impl Scalar for $ty {
            const KIND: ScalarKind = $kind;
            const SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn read(bytes: &[u8]) -> Self {
                <$ty>::from_le_bytes(take(bytes))
            }

            #[inline]
            fn write(self, bytes: &mut [u8]) {
                bytes[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
            }
        }
    };
}

le_scalar!(i8, ScalarKind::Byte);
le_scalar!(i32, ScalarKind::Int);
le_scalar!(i64, ScalarKind::Long);
le_scalar!(f32, ScalarKind::Float);
le_scalar!(f64, ScalarKind::Double);

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Boolean;
    const SIZE: usize = 1;

    #[inline]
    fn read(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn write(self, bytes: &mut [u8]) {
        bytes[0] = u8::from(self);
    }
}

/// Record indices are stored as `i32`, with `-1` meaning `None`.
impl Scalar for Option<RecordIndex> {
    const KIND: ScalarKind = ScalarKind::Index;
    const SIZE: usize = 4;

    #[inline]
    fn read(bytes: &[u8]) -> Self {
        let raw = i32::from_le_bytes(take(bytes));
        (raw >= 0).then_some(RecordIndex(raw as u32))
    }

    #[inline]
    fn write(self, bytes: &mut [u8]) {
        let raw = match self {
            Some(index) => {
                debug_assert!(index.0 <= i32::MAX as u32, "record index {index} overflows i32");
                index.0 as i32
            }
            None => -1,
        };
        bytes[..4].copy_from_slice(&raw.to_le_bytes());
    }
}

/// Notification passed to listeners before a notifying write.
#[derive(Debug)]
pub struct AttributeChange<'a> {
    /// Name of the attribute about to change.
    pub attribute: &'a str,
    /// Record being written.
    pub index: RecordIndex,
    /// Encoded value currently stored (one element for array writes).
    pub previous: &'a [u8],
}

/// Observer of notifying attribute writes.
///
/// Listeners must be `Send + Sync` so pools stay shareable across threads
/// once construction is done.
pub trait AttributeListener: Send + Sync {
    /// Called before the new value is written.
    fn before_attribute_change(&mut self, change: &AttributeChange<'_>);
}

impl<F> AttributeListener for F
where
    F: FnMut(&AttributeChange<'_>) + Send + Sync,
{
    fn before_attribute_change(&mut self, change: &AttributeChange<'_>) {
        self(change)
    }
}

/// A scalar attribute of record kind `K` holding values of type `T`.
pub struct Attribute<K, T> {
    slot: usize,
    offset: usize,
    _marker: PhantomData<fn() -> (K, T)>,
}

impl<K: PoolObject, T: Scalar> Attribute<K, T> {
    /// Bind `field` to `pool`.
    ///
    /// # Panics
    ///
    /// Panics if `field` was not produced by the pool's layout.
    pub fn new(field: Field<T>, pool: &Pool<K>) -> Self {
        assert!(
            field.layout == pool.layout().id(),
            "field does not belong to this pool's layout"
        );
        Self {
            slot: field.slot,
            offset: field.offset,
            _marker: PhantomData,
        }
    }

    /// Read the value of the record `r` points at.
    #[inline]
    pub fn get(&self, pool: &Pool<K>, r: &Ref<K>) -> T {
        T::read(&pool.record_bytes(r)[self.offset..])
    }

    /// Write `value`, notifying listeners first.
    pub fn set(&self, pool: &mut Pool<K>, r: &Ref<K>, value: T) {
        pool.notify_before_change(self.slot, r, self.offset, T::SIZE);
        self.set_quiet(pool, r, value);
    }

    /// Write `value` without notifying listeners.
    #[inline]
    pub fn set_quiet(&self, pool: &mut Pool<K>, r: &Ref<K>, value: T) {
        value.write(&mut pool.record_bytes_mut(r)[self.offset..]);
    }
}

impl<K, T> Clone for Attribute<K, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, T> Copy for Attribute<K, T> {}

/// A fixed-length array attribute of record kind `K` with elements of
/// type `T`.
///
/// Element indices are bounds-checked against the declared length in
/// debug builds only.
pub struct ArrayAttribute<K, T> {
    slot: usize,
    offset: usize,
    len: usize,
    _marker: PhantomData<fn() -> (K, T)>,
}

impl<K: PoolObject, T: Scalar> ArrayAttribute<K, T> {
    /// Bind `field` to `pool`.
    ///
    /// # Panics
    ///
    /// Panics if `field` was not produced by the pool's layout.
    pub fn new(field: ArrayField<T>, pool: &Pool<K>) -> Self {
        assert!(
            field.layout == pool.layout().id(),
            "field does not belong to this pool's layout"
        );
        Self {
            slot: field.slot,
            offset: field.offset,
            len: field.len,
            _marker: PhantomData,
        }
    }

    /// Declared number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: zero-length arrays are rejected by the layout.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn element_offset(&self, i: usize) -> usize {
        debug_assert!(i < self.len, "element {i} out of bounds for length {}", self.len);
        self.offset + i * T::SIZE
    }

    /// Read element `i`.
    #[inline]
    pub fn get(&self, pool: &Pool<K>, r: &Ref<K>, i: usize) -> T {
        T::read(&pool.record_bytes(r)[self.element_offset(i)..])
    }

    /// Write element `i`, notifying listeners first.
    pub fn set(&self, pool: &mut Pool<K>, r: &Ref<K>, i: usize, value: T) {
        pool.notify_before_change(self.slot, r, self.element_offset(i), T::SIZE);
        self.set_quiet(pool, r, i, value);
    }

    /// Write element `i` without notifying listeners.
    #[inline]
    pub fn set_quiet(&self, pool: &mut Pool<K>, r: &Ref<K>, i: usize, value: T) {
        let at = self.element_offset(i);
        value.write(&mut pool.record_bytes_mut(r)[at..]);
    }

    /// Copy all elements into `out`, which must hold at least
    /// [`len`](Self::len) values.
    pub fn get_all(&self, pool: &Pool<K>, r: &Ref<K>, out: &mut [T]) {
        let bytes = &pool.record_bytes(r)[self.offset..];
        for (i, slot) in out[..self.len].iter_mut().enumerate() {
            *slot = T::read(&bytes[i * T::SIZE..]);
        }
    }

    /// Overwrite all elements from `values` without notifying listeners.
    pub fn set_all_quiet(&self, pool: &mut Pool<K>, r: &Ref<K>, values: &[T]) {
        let bytes = &mut pool.record_bytes_mut(r)[self.offset..];
        for (i, &value) in values[..self.len].iter().enumerate() {
            value.write(&mut bytes[i * T::SIZE..]);
        }
    }
}

impl<K, T> Clone for ArrayAttribute<K, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, T> Copy for ArrayAttribute<K, T> {}

/// Record-index attribute.
pub type IndexAttribute<K> = Attribute<K, Option<RecordIndex>>;
/// `i8` attribute.
pub type ByteAttribute<K> = Attribute<K, i8>;
/// Boolean attribute.
pub type BooleanAttribute<K> = Attribute<K, bool>;
/// `i32` attribute.
pub type IntAttribute<K> = Attribute<K, i32>;
/// `i64` attribute.
pub type LongAttribute<K> = Attribute<K, i64>;
/// `f32` attribute.
pub type FloatAttribute<K> = Attribute<K, f32>;
/// `f64` attribute.
pub type DoubleAttribute<K> = Attribute<K, f64>;
/// `i8` array attribute.
pub type ByteArrayAttribute<K> = ArrayAttribute<K, i8>;
/// `i32` array attribute.
pub type IntArrayAttribute<K> = ArrayAttribute<K, i32>;
/// `f64` array attribute.
pub type DoubleArrayAttribute<K> = ArrayAttribute<K, f64>;
