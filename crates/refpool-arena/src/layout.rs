//! Record layouts: the ordered attribute table shared by every record of
//! one kind.
//!
//! A [`Layout`] maps attribute names to their byte offset, size, and kind
//! within a record. It is built once, either through [`LayoutBuilder`]
//! (offsets assigned sequentially) or through [`Layout::define`] (explicit
//! offsets, validated for overlaps and gaps), and is immutable afterwards.
//!
//! The builder hands out typed [`Field`] / [`ArrayField`] descriptors.
//! They carry the offset and the id of the layout they belong to, and are
//! turned into pool-bound attributes by [`crate::attribute`].

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use refpool_core::{LayoutError, RecordIndex};

use crate::attribute::Scalar;

/// Counter for unique [`LayoutId`] allocation.
static LAYOUT_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identity of one built layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutId(u64);

impl LayoutId {
    fn next() -> Self {
        Self(LAYOUT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Primitive value kinds a record can store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    /// Record index into some pool; `-1` encodes "none".
    Index,
    /// Signed 8-bit integer.
    Byte,
    /// Boolean stored as one byte.
    Boolean,
    /// Signed 32-bit integer.
    Int,
    /// Signed 64-bit integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
}

impl ScalarKind {
    /// Size of one value of this kind in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Byte | Self::Boolean => 1,
            Self::Index | Self::Int | Self::Float => 4,
            Self::Long | Self::Double => 8,
        }
    }
}

/// Shape of one attribute: a single scalar or a fixed-length array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    /// One value.
    Scalar(ScalarKind),
    /// `len` consecutive values.
    Array {
        /// Element kind.
        element: ScalarKind,
        /// Number of elements.
        len: usize,
    },
}

impl AttributeKind {
    /// Total size of the attribute in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Scalar(kind) => kind.size(),
            Self::Array { element, len } => element.size() * len,
        }
    }
}

/// Declaration of one attribute at an explicit offset, input to
/// [`Layout::define`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Attribute name, unique within the layout.
    pub name: String,
    /// Value kind and shape.
    pub kind: AttributeKind,
    /// Byte offset within the record.
    pub offset: usize,
}

impl AttributeSpec {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, kind: AttributeKind, offset: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            offset,
        }
    }
}

/// One resolved entry in a layout's attribute table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeDef {
    /// Attribute name.
    pub name: String,
    /// Value kind and shape.
    pub kind: AttributeKind,
    /// Byte offset within the record.
    pub offset: usize,
    /// Size in bytes.
    pub size: usize,
}

/// The attribute table for one record kind.
///
/// Uses `IndexMap` so attributes iterate in declaration order and can be
/// addressed by position (the "slot" stored in field descriptors).
#[derive(Clone, Debug)]
pub struct Layout {
    id: LayoutId,
    attributes: IndexMap<String, AttributeDef>,
    size: usize,
}

impl Layout {
    /// Start building a layout with sequentially assigned offsets.
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::new()
    }

    /// Define a layout from attributes at explicit offsets.
    ///
    /// Attributes may be given in any order but must tile the record
    /// exactly: the first starts at byte 0, none overlap, and there are no
    /// gaps. The record size is therefore the sum of attribute sizes.
    pub fn define(specs: impl IntoIterator<Item = AttributeSpec>) -> Result<Self, LayoutError> {
        Self::define_with_id(LayoutId::next(), specs.into_iter().collect())
    }

    fn define_with_id(id: LayoutId, specs: Vec<AttributeSpec>) -> Result<Self, LayoutError> {
        if specs.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut attributes = IndexMap::with_capacity(specs.len());
        for spec in &specs {
            if let AttributeKind::Array { len: 0, .. } = spec.kind {
                return Err(LayoutError::ZeroLengthArray {
                    name: spec.name.clone(),
                });
            }
            let def = AttributeDef {
                name: spec.name.clone(),
                kind: spec.kind,
                offset: spec.offset,
                size: spec.kind.size(),
            };
            if attributes.insert(spec.name.clone(), def).is_some() {
                return Err(LayoutError::DuplicateName {
                    name: spec.name.clone(),
                });
            }
        }

        let mut by_offset: Vec<&AttributeDef> = attributes.values().collect();
        by_offset.sort_by_key(|def| def.offset);
        let mut cursor = 0usize;
        let mut previous: Option<&AttributeDef> = None;
        for def in by_offset {
            if def.offset < cursor {
                let first = previous.map(|p| p.name.clone()).unwrap_or_default();
                return Err(LayoutError::Overlap {
                    first,
                    second: def.name.clone(),
                });
            }
            if def.offset > cursor {
                return Err(LayoutError::Gap {
                    offset: def.offset,
                    expected: cursor,
                });
            }
            cursor = def.offset + def.size;
            previous = Some(def);
        }

        Ok(Self {
            id,
            attributes,
            size: cursor,
        })
    }

    /// Identity of this layout.
    pub fn id(&self) -> LayoutId {
        self.id
    }

    /// Size of one record in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.size
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the layout has no attributes. Always false for a built layout.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(name)
    }

    /// Look up an attribute by declaration position.
    pub fn attribute_at(&self, slot: usize) -> Option<&AttributeDef> {
        self.attributes.get_index(slot).map(|(_, def)| def)
    }

    /// Iterate attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes.values()
    }

    /// Typed descriptor for a scalar attribute, if `name` exists with
    /// kind `T`.
    pub fn field<T: Scalar>(&self, name: &str) -> Option<Field<T>> {
        let (slot, _, def) = self.attributes.get_full(name)?;
        (def.kind == AttributeKind::Scalar(T::KIND)).then(|| Field::new(self.id, slot, def.offset))
    }

    /// Typed descriptor for an array attribute, if `name` exists as an
    /// array of `T`.
    pub fn array_field<T: Scalar>(&self, name: &str) -> Option<ArrayField<T>> {
        let (slot, _, def) = self.attributes.get_full(name)?;
        match def.kind {
            AttributeKind::Array { element, len } if element == T::KIND => {
                Some(ArrayField::new(self.id, slot, def.offset, len))
            }
            _ => None,
        }
    }
}

/// Builds a [`Layout`] by appending attributes back to back.
///
/// Each `*_field` call returns the typed descriptor immediately; errors
/// (duplicate names, zero-length arrays) are reported by [`build`](Self::build).
pub struct LayoutBuilder {
    id: LayoutId,
    specs: Vec<AttributeSpec>,
    cursor: usize,
}

impl LayoutBuilder {
    /// Start an empty layout.
    pub fn new() -> Self {
        Self {
            id: LayoutId::next(),
            specs: Vec::new(),
            cursor: 0,
        }
    }

    /// Append a scalar attribute of type `T`.
    pub fn field<T: Scalar>(&mut self, name: impl Into<String>) -> Field<T> {
        let slot = self.push(name.into(), AttributeKind::Scalar(T::KIND));
        Field::new(self.id, slot, self.specs[slot].offset)
    }

    /// Append an array attribute of `len` values of type `T`.
    pub fn array_field<T: Scalar>(&mut self, name: impl Into<String>, len: usize) -> ArrayField<T> {
        let slot = self.push(
            name.into(),
            AttributeKind::Array {
                element: T::KIND,
                len,
            },
        );
        ArrayField::new(self.id, slot, self.specs[slot].offset, len)
    }

    /// Append a record-index attribute.
    pub fn index_field(&mut self, name: impl Into<String>) -> Field<Option<RecordIndex>> {
        self.field(name)
    }

    /// Append an `i32` attribute.
    pub fn int_field(&mut self, name: impl Into<String>) -> Field<i32> {
        self.field(name)
    }

    /// Append an `i64` attribute.
    pub fn long_field(&mut self, name: impl Into<String>) -> Field<i64> {
        self.field(name)
    }

    /// Append an `f32` attribute.
    pub fn float_field(&mut self, name: impl Into<String>) -> Field<f32> {
        self.field(name)
    }

    /// Append an `f64` attribute.
    pub fn double_field(&mut self, name: impl Into<String>) -> Field<f64> {
        self.field(name)
    }

    /// Append an `i8` attribute.
    pub fn byte_field(&mut self, name: impl Into<String>) -> Field<i8> {
        self.field(name)
    }

    /// Append a boolean attribute.
    pub fn boolean_field(&mut self, name: impl Into<String>) -> Field<bool> {
        self.field(name)
    }

    /// Append an `i8` array attribute.
    pub fn byte_array_field(&mut self, name: impl Into<String>, len: usize) -> ArrayField<i8> {
        self.array_field(name, len)
    }

    /// Append an `i32` array attribute.
    pub fn int_array_field(&mut self, name: impl Into<String>, len: usize) -> ArrayField<i32> {
        self.array_field(name, len)
    }

    /// Append an `f64` array attribute.
    pub fn double_array_field(&mut self, name: impl Into<String>, len: usize) -> ArrayField<f64> {
        self.array_field(name, len)
    }

    fn push(&mut self, name: String, kind: AttributeKind) -> usize {
        let slot = self.specs.len();
        self.specs.push(AttributeSpec {
            name,
            kind,
            offset: self.cursor,
        });
        self.cursor += kind.size();
        slot
    }

    /// Finish the layout.
    pub fn build(self) -> Result<Layout, LayoutError> {
        Layout::define_with_id(self.id, self.specs)
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed descriptor of a scalar attribute within one layout.
///
/// Independent of any record instance or pool; bind it to a pool with
/// [`Attribute::new`](crate::attribute::Attribute::new).
#[derive(Debug)]
pub struct Field<T> {
    pub(crate) layout: LayoutId,
    pub(crate) slot: usize,
    pub(crate) offset: usize,
    _value: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    fn new(layout: LayoutId, slot: usize, offset: usize) -> Self {
        Self {
            layout,
            slot,
            offset,
            _value: PhantomData,
        }
    }

    /// Byte offset within the record.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

/// Typed descriptor of a fixed-length array attribute within one layout.
#[derive(Debug)]
pub struct ArrayField<T> {
    pub(crate) layout: LayoutId,
    pub(crate) slot: usize,
    pub(crate) offset: usize,
    pub(crate) len: usize,
    _value: PhantomData<fn() -> T>,
}

impl<T> ArrayField<T> {
    fn new(layout: LayoutId, slot: usize, offset: usize, len: usize) -> Self {
        Self {
            layout,
            slot,
            offset,
            len,
            _value: PhantomData,
        }
    }

    /// Byte offset of element 0 within the record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Declared number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: zero-length arrays are rejected at build time.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Clone for ArrayField<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArrayField<T> {}
