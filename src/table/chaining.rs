//! Separate chaining over parallel index arrays.
//!
//! Chains are doubly linked through `next`/`prev` arrays of `i32` indices
//! rather than boxed nodes. Free slots form a singly linked list threaded
//! through `next`, so allocation and release are O(1) and the table never
//! allocates between resizes.
//!
//! ## Architecture
//!
//! ```text
//!   bucket_head:  [ 3 ][NIL][ 0 ][NIL] ...
//!                   │         │
//!                   ▼         ▼
//!   slot 3 ──next──► slot 1   slot 0
//!   prev[3] = -(0)-1          prev[0] = -(2)-1     chain head: bucket encoded
//!   prev[1] = 3                                    inner link: predecessor
//!
//!   free_head ──► 15 ──► 14 ──► ... ──► NIL        prev[free] == NIL
//! ```
//!
//! ## Operations
//!
//! | Operation | Cost             | Notes                                      |
//! |-----------|------------------|--------------------------------------------|
//! | `find`    | O(chain)         | compares cached hash before key bytes      |
//! | `insert`  | O(chain)         | duplicate walk, pop free slot, splice head |
//! | `remove`  | O(1)             | unlink via `prev`, push onto free list     |
//! | grow      | O(n)             | only when the free list is empty           |

use crate::ds::{SlotArena, SlotId, bytes_eq};
use crate::error::InvariantError;
use crate::hash::fold_to_index;

use super::{Entry, SlotTable, check_slot_positions, entry_at, set_slot};

const NIL: i32 = i32::MIN;

/// Chained hash table addressed by `i32` links.
#[derive(Debug)]
pub struct ChainingTable {
    bucket_head: Vec<i32>,
    next: Vec<i32>,
    prev: Vec<i32>,
    slots: Vec<Option<SlotId>>,
    free_head: i32,
    len: usize,
    collisions: u64,
    resizes: u64,
}

impl ChainingTable {
    fn alloc(capacity: usize) -> Self {
        assert!(
            capacity <= i32::MAX as usize,
            "chaining table capacity exceeds i32 links"
        );
        let mut table = Self {
            bucket_head: vec![NIL; capacity],
            next: vec![NIL; capacity],
            prev: vec![NIL; capacity],
            slots: vec![None; capacity],
            free_head: NIL,
            len: 0,
            collisions: 0,
            resizes: 0,
        };
        table.format();
        table
    }

    /// Threads every slot onto the free list, highest index first.
    fn format(&mut self) {
        let cap = self.slots.len();
        self.next[0] = NIL;
        for i in 1..cap {
            self.next[i] = (i - 1) as i32;
        }
        self.free_head = (cap - 1) as i32;
    }

    #[inline]
    fn is_free(&self, slot: usize) -> bool {
        self.prev[slot] == NIL
    }

    /// Pops a free slot and splices it in as the new head of `bucket`.
    fn link_new(&mut self, bucket: usize, count_collision: bool) -> usize {
        debug_assert!(self.free_head != NIL, "free list is empty");
        let slot = self.free_head as usize;
        debug_assert!(self.is_free(slot), "free head {} is in use", slot);
        self.free_head = self.next[slot];

        let old_head = self.bucket_head[bucket];
        self.next[slot] = old_head;
        if old_head != NIL {
            self.prev[old_head as usize] = slot as i32;
            if count_collision {
                self.collisions += 1;
            }
        }
        self.prev[slot] = -(bucket as i32) - 1;
        self.bucket_head[bucket] = slot as i32;
        self.len += 1;
        slot
    }

    fn grow<V>(&mut self, entries: &mut SlotArena<Entry<V>>) {
        let old_capacity = self.slots.len();
        let new_capacity = old_capacity * 2;
        let ids: Vec<SlotId> = self.slots.iter().flatten().copied().collect();

        let mut grown = Self::alloc(new_capacity);
        grown.collisions = self.collisions;
        grown.resizes = self.resizes + 1;
        for id in ids {
            let bucket = fold_to_index(entry_at(entries, id).hash(), new_capacity);
            let slot = grown.link_new(bucket, false);
            grown.slots[slot] = Some(id);
            set_slot(entries, id, slot);
        }
        *self = grown;

        tracing::debug!(
            table = Self::NAME,
            old_capacity,
            new_capacity,
            len = self.len,
            "grew slot table"
        );
    }
}

impl SlotTable for ChainingTable {
    const NAME: &'static str = "chaining";

    fn with_capacity(capacity: usize, _load_factor_pct: u32) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self::alloc(capacity)
    }

    fn find<V>(&self, key: &[u8], hash: i32, entries: &SlotArena<Entry<V>>) -> Option<usize> {
        let bucket = fold_to_index(hash, self.slots.len());
        let mut cursor = self.bucket_head[bucket];
        let mut steps = 0;
        while cursor != NIL && steps < self.slots.len() {
            let slot = cursor as usize;
            if let Some(id) = self.slots[slot] {
                let entry = entry_at(entries, id);
                if entry.hash() == hash && bytes_eq(entry.key().as_bytes(), key) {
                    return Some(slot);
                }
            }
            cursor = self.next[slot];
            steps += 1;
        }
        None
    }

    fn insert<V>(
        &mut self,
        entry: Entry<V>,
        entries: &mut SlotArena<Entry<V>>,
    ) -> Result<SlotId, Entry<V>> {
        if self
            .find(entry.key().as_bytes(), entry.hash(), entries)
            .is_some()
        {
            return Err(entry);
        }
        if self.free_head == NIL {
            self.grow(entries);
        }

        let bucket = fold_to_index(entry.hash(), self.slots.len());
        let id = entries.insert(entry);
        let slot = self.link_new(bucket, true);
        self.slots[slot] = Some(id);
        set_slot(entries, id, slot);
        Ok(id)
    }

    fn remove<V>(&mut self, slot: usize, entries: &mut SlotArena<Entry<V>>) -> Option<SlotId> {
        if slot >= self.slots.len() || self.is_free(slot) {
            return None;
        }

        let next = self.next[slot];
        let prev = self.prev[slot];
        if next != NIL {
            self.prev[next as usize] = prev;
        }
        if prev < 0 {
            self.bucket_head[(-(prev + 1)) as usize] = next;
        } else {
            self.next[prev as usize] = next;
        }

        self.next[slot] = self.free_head;
        self.prev[slot] = NIL;
        self.free_head = slot as i32;
        self.len -= 1;

        let id = self.slots[slot].take()?;
        if let Some(entry) = entries.get_mut(id) {
            entry.slot = usize::MAX;
        }
        Some(id)
    }

    #[inline]
    fn id_at(&self, slot: usize) -> Option<SlotId> {
        self.slots.get(slot).copied().flatten()
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn collisions(&self) -> u64 {
        self.collisions
    }

    fn resizes(&self) -> u64 {
        self.resizes
    }

    fn check_invariants<V>(&self, entries: &SlotArena<Entry<V>>) -> Result<(), InvariantError> {
        let cap = self.slots.len();

        for slot in 0..cap {
            if self.is_free(slot) != self.slots[slot].is_none() {
                return Err(InvariantError::new(format!(
                    "chaining: slot {} free marker disagrees with its contents",
                    slot
                )));
            }
        }

        let mut chained = 0;
        for bucket in 0..cap {
            let mut expected_prev = -(bucket as i32) - 1;
            let mut cursor = self.bucket_head[bucket];
            while cursor != NIL {
                let slot = cursor as usize;
                if chained >= cap {
                    return Err(InvariantError::new("chaining: chain cycle detected"));
                }
                if self.prev[slot] != expected_prev {
                    return Err(InvariantError::new(format!(
                        "chaining: slot {} has prev {} but expected {}",
                        slot, self.prev[slot], expected_prev
                    )));
                }
                let id = self.slots[slot].ok_or_else(|| {
                    InvariantError::new(format!("chaining: free slot {} is chained", slot))
                })?;
                let entry = entries.get(id).ok_or_else(|| {
                    InvariantError::new(format!("chaining: slot {} holds stale handle", slot))
                })?;
                if fold_to_index(entry.hash(), cap) != bucket {
                    return Err(InvariantError::new(format!(
                        "chaining: {:?} chained under bucket {} but hashes elsewhere",
                        entry.key(),
                        bucket
                    )));
                }
                chained += 1;
                expected_prev = cursor;
                cursor = self.next[slot];
            }
        }

        let mut free = 0;
        let mut cursor = self.free_head;
        while cursor != NIL {
            if free >= cap || !self.is_free(cursor as usize) {
                return Err(InvariantError::new(format!(
                    "chaining: free list corrupted at slot {}",
                    cursor
                )));
            }
            free += 1;
            cursor = self.next[cursor as usize];
        }

        if chained + free != cap {
            return Err(InvariantError::new(format!(
                "chaining: {} chained + {} free != capacity {}",
                chained, free, cap
            )));
        }

        check_slot_positions(
            Self::NAME,
            self.slots
                .iter()
                .enumerate()
                .filter_map(|(slot, id)| id.map(|id| (slot, id))),
            self.len,
            entries,
        )
    }
}
