//! Walking the live records of a pool.
//!
//! Two flavours: [`PoolIter`] yields a fresh [`Ref`] per record and is
//! convenient for tests and setup code; [`PoolCursor`] repoints one
//! caller-owned reference and allocates nothing.

use refpool_core::RecordIndex;

use crate::handle::Ref;
use crate::pool::{Pool, PoolObject};

/// Iterator over live records, yielding one new reference per record.
pub struct PoolIter<'a, K> {
    pool: &'a Pool<K>,
    next: u32,
}

impl<'a, K: PoolObject> PoolIter<'a, K> {
    pub(crate) fn new(pool: &'a Pool<K>) -> Self {
        Self { pool, next: 0 }
    }
}

impl<K: PoolObject> Iterator for PoolIter<'_, K> {
    type Item = Ref<K>;

    fn next(&mut self) -> Option<Ref<K>> {
        let index = next_live(self.pool, &mut self.next)?;
        let mut r = self.pool.create_ref();
        self.pool.get_object(index, &mut r);
        Some(r)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.pool.high_water().saturating_sub(self.next) as usize;
        (0, Some(remaining))
    }
}

/// Allocation-free walk over live records.
///
/// ```ignore
/// let mut cursor = pool.cursor();
/// let mut r = pool.create_ref();
/// while cursor.advance(&pool, &mut r) {
///     total += value.get(&pool, &r);
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct PoolCursor {
    next: u32,
}

impl PoolCursor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Repoint `r` at the next live record. Returns `false` once every
    /// live record has been visited; `r` is then left where it was.
    pub fn advance<K: PoolObject>(&mut self, pool: &Pool<K>, r: &mut Ref<K>) -> bool {
        match next_live(pool, &mut self.next) {
            Some(index) => {
                pool.get_object(index, r);
                true
            }
            None => false,
        }
    }

    /// Start over from the first record.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

fn next_live<K: PoolObject>(pool: &Pool<K>, next: &mut u32) -> Option<RecordIndex> {
    while *next < pool.high_water() {
        let index = RecordIndex(*next);
        *next += 1;
        if pool.is_live(index) {
            return Some(index);
        }
    }
    None
}
