//! Contiguous record blocks and the growable record storage over them.
//!
//! A [`Segment`] is a zero-initialised `Vec<u8>` holding a whole number of
//! fixed-size records. [`RecordStorage`] maps record indices onto one or
//! more segments according to the pool's [`StorageMode`]:
//!
//! - `SingleArray`: one segment, reallocated at double size when full.
//!   Indices stay valid across growth; byte slices borrowed before the
//!   growth do not (the borrow checker already forbids holding them).
//! - `Segmented`: equal-sized segments appended on growth. Segments never
//!   move, and `index -> (segment, offset)` is a shift and a mask.

use refpool_core::{PoolError, RecordIndex};

use crate::config::{PoolConfig, StorageMode};

/// A single contiguous block of record memory.
pub struct Segment {
    /// Backing bytes, always a multiple of the record size.
    data: Vec<u8>,
    record_size: usize,
}

impl Segment {
    /// Create a zeroed segment with room for `records` records.
    pub fn new(records: u32, record_size: usize) -> Self {
        Self {
            data: vec![0; records as usize * record_size],
            record_size,
        }
    }

    /// Bytes of the record in slot `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is beyond this segment's capacity.
    #[inline]
    pub fn record(&self, slot: usize) -> &[u8] {
        let start = slot * self.record_size;
        &self.data[start..start + self.record_size]
    }

    /// Mutable bytes of the record in slot `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is beyond this segment's capacity.
    #[inline]
    pub fn record_mut(&mut self, slot: usize) -> &mut [u8] {
        let start = slot * self.record_size;
        &mut self.data[start..start + self.record_size]
    }

    /// Resize to hold `records` records, zero-filling any new tail.
    pub fn resize(&mut self, records: u32) {
        self.data.resize(records as usize * self.record_size, 0);
    }

    /// Number of records this segment can hold.
    pub fn capacity(&self) -> usize {
        self.data.len() / self.record_size
    }

    /// Memory usage of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.len()
    }

    /// The raw bytes of the whole segment.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Growable storage for fixed-size records.
pub struct RecordStorage {
    segments: Vec<Segment>,
    record_size: usize,
    mode: StorageMode,
    /// `log2(records_per_segment)` in segmented mode.
    shift: u32,
    /// `records_per_segment - 1` in segmented mode.
    mask: u32,
    capacity: u32,
    max_records: u32,
    grow_events: u64,
}

impl RecordStorage {
    /// Smallest capacity a single-array storage grows to.
    const MIN_GROWTH: u32 = 16;

    /// Create storage for records of `record_size` bytes.
    ///
    /// The config must already have passed [`PoolConfig::validate`].
    pub fn new(record_size: usize, config: &PoolConfig) -> Self {
        let (shift, mask) = match config.storage {
            StorageMode::SingleArray => (0, 0),
            StorageMode::Segmented {
                records_per_segment,
            } => (records_per_segment.trailing_zeros(), records_per_segment - 1),
        };
        let mut storage = Self {
            segments: Vec::new(),
            record_size,
            mode: config.storage,
            shift,
            mask,
            capacity: 0,
            max_records: config.max_records,
            grow_events: 0,
        };
        match storage.mode {
            StorageMode::SingleArray => {
                storage
                    .segments
                    .push(Segment::new(config.initial_capacity, record_size));
                storage.capacity = config.initial_capacity;
            }
            StorageMode::Segmented { .. } => {
                while storage.capacity < config.initial_capacity {
                    storage.push_segment();
                }
            }
        }
        storage
    }

    /// Make room for at least `required` records.
    ///
    /// Returns `Ok(true)` if storage grew, `Ok(false)` if it was already
    /// large enough, or `Err(CapacityExceeded)` past `max_records`.
    pub fn ensure_capacity(&mut self, required: u32) -> Result<bool, PoolError> {
        if required <= self.capacity {
            return Ok(false);
        }
        if required > self.max_records {
            return Err(PoolError::CapacityExceeded {
                requested: required as usize,
                max: self.max_records as usize,
            });
        }
        match self.mode {
            StorageMode::SingleArray => {
                let doubled = self.capacity.saturating_mul(2).max(Self::MIN_GROWTH);
                let new_cap = doubled.max(required).min(self.max_records);
                self.segments[0].resize(new_cap);
                self.capacity = new_cap;
            }
            StorageMode::Segmented { .. } => {
                while self.capacity < required {
                    self.push_segment();
                }
            }
        }
        self.grow_events += 1;
        Ok(true)
    }

    fn push_segment(&mut self) {
        let per_segment = self.mask + 1;
        self.segments.push(Segment::new(per_segment, self.record_size));
        self.capacity = self.capacity.saturating_add(per_segment);
    }

    /// Map a record index to `(segment, slot within segment)`.
    #[inline]
    pub fn locate(&self, index: RecordIndex) -> (usize, usize) {
        match self.mode {
            StorageMode::SingleArray => (0, index.as_usize()),
            StorageMode::Segmented { .. } => (
                (index.0 >> self.shift) as usize,
                (index.0 & self.mask) as usize,
            ),
        }
    }

    /// Bytes of the record at `index`.
    #[inline]
    pub fn record(&self, index: RecordIndex) -> &[u8] {
        let (segment, slot) = self.locate(index);
        self.segments[segment].record(slot)
    }

    /// Mutable bytes of the record at `index`.
    #[inline]
    pub fn record_mut(&mut self, index: RecordIndex) -> &mut [u8] {
        let (segment, slot) = self.locate(index);
        self.segments[segment].record_mut(slot)
    }

    /// Copy the bytes of record `from` over record `to`.
    pub fn copy_record(&mut self, from: RecordIndex, to: RecordIndex) {
        if from == to {
            return;
        }
        let (fs, fslot) = self.locate(from);
        let (ts, tslot) = self.locate(to);
        let size = self.record_size;
        if fs == ts {
            let bytes = &mut self.segments[fs].data;
            bytes.copy_within(fslot * size..(fslot + 1) * size, tslot * size);
        } else {
            let (src, dst) = if fs < ts {
                let (lo, hi) = self.segments.split_at_mut(ts);
                (&lo[fs], &mut hi[0])
            } else {
                let (lo, hi) = self.segments.split_at_mut(fs);
                (&hi[0], &mut lo[ts])
            };
            dst.record_mut(tslot).copy_from_slice(src.record(fslot));
        }
    }

    /// Number of records storage currently has room for.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Size of one record in bytes.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Number of segments currently allocated.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segments in order, for raw inspection.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of times storage has grown since construction.
    pub fn grow_events(&self) -> u64 {
        self.grow_events
    }

    /// Total memory usage across all segments in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.segments.iter().map(|s| s.memory_bytes()).sum()
    }
}
