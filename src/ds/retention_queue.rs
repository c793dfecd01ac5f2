//! Fixed-capacity FIFO ring buffer for the inactive retention window.
//!
//! Holds handles to inactive entries in the order they were retired. The
//! capacity is a power of two so positions wrap with a mask instead of a
//! modulo. A full queue refuses new items; the owning map evicts the oldest
//! member first and then pushes ("evict-then-put").
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 RetentionQueue<T> (capacity = 4)                    │
//! │                                                                     │
//! │   After put(A), put(B), put(C), take() → A, put(D), put(E):         │
//! │                                                                     │
//! │   Index:     0     1     2     3                                    │
//! │            ┌─────┬─────┬─────┬─────┐                                │
//! │   items:   │  E  │  B  │  C  │  D  │                                │
//! │            └─────┴─────┴─────┴─────┘                                │
//! │                     ▲                                               │
//! │                     │                                               │
//! │                   first = 1 (oldest)      last = 1 (next write)     │
//! │                   len = 4 → is_full()                               │
//! │                                                                     │
//! │   put(x):   items[last] = x; last = (last + 1) & mask; len += 1     │
//! │   take():   x = items[first]; first = (first + 1) & mask; len -= 1  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation          | Description                          | Complexity |
//! |--------------------|--------------------------------------|------------|
//! | [`put`]            | Append at the tail (refused if full) | O(1)       |
//! | [`take`]           | Remove the oldest item               | O(1)       |
//! | [`peek`]           | Borrow the oldest item               | O(1)       |
//! | [`remove`]         | Remove an arbitrary item, keep order | O(n)       |
//! | [`iter`]           | Iterate oldest to newest             | O(n)       |
//!
//! [`put`]: RetentionQueue::put
//! [`take`]: RetentionQueue::take
//! [`peek`]: RetentionQueue::peek
//! [`remove`]: RetentionQueue::remove
//! [`iter`]: RetentionQueue::iter
//!
//! ## Example Usage
//!
//! ```
//! use retirekit::ds::RetentionQueue;
//!
//! let mut queue = RetentionQueue::new(2);
//! assert!(queue.put("O1").is_ok());
//! assert!(queue.put("O2").is_ok());
//! assert!(queue.is_full());
//!
//! // Full: the item is handed back
//! assert_eq!(queue.put("O3"), Err("O3"));
//!
//! // Evict-then-put
//! assert_eq!(queue.take(), Some("O1"));
//! assert!(queue.put("O3").is_ok());
//! assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec!["O2", "O3"]);
//! ```
//!
//! ## Implementation Notes
//!
//! - `remove` exists for model-based consistency checks; no hot path uses it
//! - `debug_validate_invariants()` available in debug/test builds

use crate::error::ConfigError;

/// Fixed-capacity FIFO queue with power-of-two capacity.
#[derive(Debug, Clone)]
pub struct RetentionQueue<T> {
    items: Box<[Option<T>]>,
    mask: usize,
    first: usize,
    last: usize,
    len: usize,
}

impl<T> RetentionQueue<T> {
    /// Creates a queue holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of two. Use
    /// [`try_new`](Self::try_new) for user-supplied sizes.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(queue) => queue,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates a queue holding at most `capacity` items, validating that the
    /// capacity is a power of two.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if !capacity.is_power_of_two() {
            return Err(ConfigError::new(format!(
                "retention capacity must be a power of two, got {}",
                capacity
            )));
        }
        Ok(Self {
            items: (0..capacity).map(|_| None).collect(),
            mask: capacity - 1,
            first: 0,
            last: 0,
            len: 0,
        })
    }

    /// Returns the maximum number of items.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of queued items.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the next [`put`](Self::put) would be refused.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.items.len()
    }

    /// Appends `item` at the tail.
    ///
    /// Returns the item back as `Err` when the queue is full; the caller is
    /// expected to [`take`](Self::take) the oldest item first.
    pub fn put(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.items[self.last] = Some(item);
        self.last = (self.last + 1) & self.mask;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the oldest item.
    pub fn take(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = self.items[self.first].take();
        self.first = (self.first + 1) & self.mask;
        self.len -= 1;
        item
    }

    /// Returns the oldest item without removing it.
    pub fn peek(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.items[self.first].as_ref()
    }

    /// Iterates from the oldest to the newest item.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        (0..self.len).map(move |i| {
            self.items[(self.first + i) & self.mask]
                .as_ref()
                .expect("occupied ring position is empty")
        })
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        for slot in self.items.iter_mut() {
            *slot = None;
        }
        self.first = 0;
        self.last = 0;
        self.len = 0;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert!(self.len <= self.items.len());
        assert!(self.first <= self.mask && self.last <= self.mask);
        assert_eq!((self.first + self.len) & self.mask, self.last);
        let occupied = self.items.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, self.len);
    }
}

impl<T: PartialEq> RetentionQueue<T> {
    /// Removes the first item equal to `item`, keeping the relative order of
    /// the rest. Returns `true` if an item was removed.
    ///
    /// O(n): shifts every older item one position towards the tail.
    pub fn remove(&mut self, item: &T) -> bool {
        let found = (0..self.len)
            .find(|&i| self.items[(self.first + i) & self.mask].as_ref() == Some(item));
        let Some(pos) = found else {
            return false;
        };

        for j in (1..=pos).rev() {
            let dst = (self.first + j) & self.mask;
            let src = (self.first + j - 1) & self.mask;
            self.items[dst] = self.items[src].take();
        }
        self.items[self.first] = None;
        self.first = (self.first + 1) & self.mask;
        self.len -= 1;
        true
    }

    /// Returns `true` if an item equal to `item` is queued. O(n).
    pub fn contains(&self, item: &T) -> bool {
        self.iter().any(|queued| queued == item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two_capacity() {
        for cap in [0, 3, 6, 100] {
            assert!(RetentionQueue::<u32>::try_new(cap).is_err(), "cap {}", cap);
        }
        for cap in [1, 2, 64] {
            assert!(RetentionQueue::<u32>::try_new(cap).is_ok(), "cap {}", cap);
        }
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn new_panics_on_invalid_capacity() {
        let _ = RetentionQueue::<u32>::new(12);
    }

    #[test]
    fn fifo_order_and_full_rejection() {
        let mut queue = RetentionQueue::new(4);
        for i in 0..4 {
            assert_eq!(queue.put(i), Ok(()));
        }
        assert!(queue.is_full());
        assert_eq!(queue.put(99), Err(99));
        assert_eq!(queue.len(), 4);

        assert_eq!(queue.take(), Some(0));
        assert_eq!(queue.take(), Some(1));
        assert_eq!(queue.put(4), Ok(()));
        assert_eq!(queue.put(5), Ok(()));
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
        queue.debug_validate_invariants();
    }

    #[test]
    fn take_and_peek_on_empty() {
        let mut queue: RetentionQueue<u32> = RetentionQueue::new(2);
        assert_eq!(queue.take(), None);
        assert_eq!(queue.peek(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn capacity_one_holds_single_item() {
        let mut queue = RetentionQueue::new(1);
        assert!(queue.put('a').is_ok());
        assert!(queue.is_full());
        assert_eq!(queue.peek(), Some(&'a'));
        assert_eq!(queue.take(), Some('a'));
        assert!(queue.put('b').is_ok());
        assert_eq!(queue.take(), Some('b'));
        queue.debug_validate_invariants();
    }

    #[test]
    fn remove_middle_keeps_order_across_wrap() {
        let mut queue = RetentionQueue::new(4);
        for i in 0..4 {
            queue.put(i).unwrap();
        }
        queue.take();
        queue.take();
        queue.put(4).unwrap();
        queue.put(5).unwrap(); // ring now wraps: [4, 5, 2, 3]

        assert!(queue.remove(&4));
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![2, 3, 5]);
        assert!(!queue.remove(&42));
        assert!(queue.remove(&2));
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![3, 5]);
        assert!(queue.contains(&5));
        assert!(!queue.contains(&2));
        queue.debug_validate_invariants();
    }

    #[test]
    fn clear_resets_state() {
        let mut queue = RetentionQueue::new(2);
        queue.put(1).unwrap();
        queue.put(2).unwrap();
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.put(3).is_ok());
        assert_eq!(queue.take(), Some(3));
        queue.debug_validate_invariants();
    }
}

#[cfg(test)]
mod property_tests {
    use std::collections::VecDeque;

    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Put(u16),
        Take,
        Remove(u16),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => any::<u16>().prop_map(|v| Op::Put(v % 64)),
            2 => Just(Op::Take),
            1 => any::<u16>().prop_map(|v| Op::Remove(v % 64)),
        ]
    }

    proptest! {
        /// Property: behavior matches a bounded VecDeque reference
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_reference_implementation(
            shift in 0u32..5,
            ops in prop::collection::vec(op_strategy(), 0..200)
        ) {
            let capacity = 1usize << shift;
            let mut queue = RetentionQueue::new(capacity);
            let mut reference: VecDeque<u16> = VecDeque::new();

            for op in ops {
                match op {
                    Op::Put(v) => {
                        let accepted = queue.put(v).is_ok();
                        prop_assert_eq!(accepted, reference.len() < capacity);
                        if accepted {
                            reference.push_back(v);
                        }
                    },
                    Op::Take => {
                        prop_assert_eq!(queue.take(), reference.pop_front());
                    },
                    Op::Remove(v) => {
                        let expected = match reference.iter().position(|x| *x == v) {
                            Some(pos) => {
                                reference.remove(pos);
                                true
                            },
                            None => false,
                        };
                        prop_assert_eq!(queue.remove(&v), expected);
                    },
                }

                prop_assert_eq!(queue.len(), reference.len());
                prop_assert_eq!(queue.is_full(), reference.len() == capacity);
                let items: Vec<u16> = queue.iter().copied().collect();
                let expected: Vec<u16> = reference.iter().copied().collect();
                prop_assert_eq!(items, expected);
                queue.debug_validate_invariants();
            }
        }
    }
}
