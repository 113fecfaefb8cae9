//! A binary min-heap of references ordered by a pool-aware comparator.
//!
//! `std::collections::BinaryHeap` needs `Ord` on its elements, but the
//! ordering of two references depends on the record bytes they point at,
//! which live in the pool. The heap here is the same array-backed binary
//! heap with the comparison taking the pool as an extra argument.

use std::cmp::Ordering;

use crate::handle::Ref;
use crate::pool::{Pool, PoolObject};

/// Orders two references by the records they point at.
pub trait RefComparator<K> {
    /// Compare the records `a` and `b` point at.
    fn compare(&self, pool: &Pool<K>, a: &Ref<K>, b: &Ref<K>) -> Ordering;
}

impl<K, F> RefComparator<K> for F
where
    F: Fn(&Pool<K>, &Ref<K>, &Ref<K>) -> Ordering,
{
    fn compare(&self, pool: &Pool<K>, a: &Ref<K>, b: &Ref<K>) -> Ordering {
        self(pool, a, b)
    }
}

/// Min-priority queue of references into one pool.
///
/// The element with the smallest priority according to the comparator is
/// polled first. Ties are broken arbitrarily. The queue does not own the
/// records: it stores which record each entry points at, and the caller
/// keeps the pool alive and unchanged in the fields the comparator reads
/// while the entry is queued.
pub struct RefPriorityQueue<K, C> {
    heap: Vec<Ref<K>>,
    comparator: C,
}

impl<K: PoolObject, C: RefComparator<K>> RefPriorityQueue<K, C> {
    /// Create an empty queue ordered by `comparator`.
    pub fn new(comparator: C) -> Self {
        Self::with_capacity(comparator, 0)
    }

    /// Create an empty queue with room for `capacity` entries.
    pub fn with_capacity(comparator: C, capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            comparator,
        }
    }

    /// Insert the record `r` points at. O(log n).
    pub fn offer(&mut self, pool: &Pool<K>, r: &Ref<K>) {
        self.heap.push(r.duplicate());
        self.sift_up(pool, self.heap.len() - 1);
    }

    /// Remove the smallest entry and repoint `r` at it.
    ///
    /// Returns `false`, leaving `r` untouched, when the queue is empty.
    pub fn poll_into(&mut self, pool: &Pool<K>, r: &mut Ref<K>) -> bool {
        let Some(last) = self.heap.pop() else {
            return false;
        };
        if self.heap.is_empty() {
            r.repoint_to(&last);
        } else {
            let top = std::mem::replace(&mut self.heap[0], last);
            r.repoint_to(&top);
            self.sift_down(pool, 0);
        }
        true
    }

    /// Repoint `r` at the smallest entry without removing it.
    pub fn peek_into(&self, r: &mut Ref<K>) -> bool {
        match self.heap.first() {
            Some(top) => {
                r.repoint_to(top);
                true
            }
            None => false,
        }
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop all entries, keeping the allocation.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// The comparator ordering this queue.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    fn less(&self, pool: &Pool<K>, a: usize, b: usize) -> bool {
        self.comparator.compare(pool, &self.heap[a], &self.heap[b]) == Ordering::Less
    }

    fn sift_up(&mut self, pool: &Pool<K>, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pool, pos, parent) {
                break;
            }
            self.heap.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, pool: &Pool<K>, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.less(pool, right, left) {
                right
            } else {
                left
            };
            if !self.less(pool, child, pos) {
                break;
            }
            self.heap.swap(pos, child);
            pos = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::DoubleAttribute;
    use crate::layout::Layout;

    struct Task;
    impl PoolObject for Task {}

    fn task_pool() -> (Pool<Task>, DoubleAttribute<Task>) {
        let mut b = Layout::builder();
        let p = b.double_field("priority");
        let pool = Pool::with_capacity(b.build().unwrap(), 16).unwrap();
        let p = DoubleAttribute::new(p, &pool);
        (pool, p)
    }

    fn by_priority(
        p: DoubleAttribute<Task>,
    ) -> impl Fn(&Pool<Task>, &Ref<Task>, &Ref<Task>) -> Ordering {
        move |pool, a, b| p.get(pool, a).total_cmp(&p.get(pool, b))
    }

    #[test]
    fn polls_in_priority_order() {
        let (mut pool, p) = task_pool();
        let mut queue = RefPriorityQueue::new(by_priority(p));
        let mut r = pool.create_ref();
        for v in [5.0, 1.0, 4.0, 2.0, 3.0] {
            pool.create_into(&mut r);
            p.set_quiet(&mut pool, &r, v);
            queue.offer(&pool, &r);
        }
        assert_eq!(queue.len(), 5);

        let mut peeked = pool.create_ref();
        assert!(queue.peek_into(&mut peeked));
        assert_eq!(p.get(&pool, &peeked), 1.0);

        let mut out = Vec::new();
        while queue.poll_into(&pool, &mut r) {
            out.push(p.get(&pool, &r));
        }
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn poll_on_empty_leaves_reference_alone() {
        let (mut pool, p) = task_pool();
        let mut queue = RefPriorityQueue::new(by_priority(p));
        let mut r = pool.create();
        let before = r.index();
        assert!(!queue.poll_into(&pool, &mut r));
        assert_eq!(r.index(), before);
        assert!(!queue.peek_into(&mut r));
    }

    #[test]
    fn clear_empties_queue() {
        let (mut pool, p) = task_pool();
        let mut queue = RefPriorityQueue::new(by_priority(p));
        let r = pool.create();
        queue.offer(&pool, &r);
        queue.offer(&pool, &r);
        let before = pool.stats();
        queue.clear();
        assert_eq!(queue.len(), 0);
        // Only indices are dropped; the record stays live.
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.stats(), before);
        assert!(pool.check(&r).is_ok());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn drains_sorted(values in prop::collection::vec(-1e6f64..1e6, 0..64)) {
                let (mut pool, p) = task_pool();
                let mut queue = RefPriorityQueue::new(by_priority(p));
                let mut r = pool.create_ref();
                for &v in &values {
                    pool.create_into(&mut r);
                    p.set_quiet(&mut pool, &r, v);
                    queue.offer(&pool, &r);
                }
                let mut drained = Vec::with_capacity(values.len());
                while queue.poll_into(&pool, &mut r) {
                    drained.push(p.get(&pool, &r));
                }
                let mut expected = values.clone();
                expected.sort_by(f64::total_cmp);
                prop_assert_eq!(drained, expected);
            }
        }
    }
}
