//! Robin Hood linear probing.
//!
//! Each occupied slot records its probe sequence length (PSL): how far the
//! entry sits from its home bucket. Insertion steals from the rich: when the
//! incoming entry has probed further than the resident, they swap and the
//! resident continues probing. A lookup that has travelled further than the
//! resident's PSL can stop: its key would have displaced that resident.
//! Deletion shifts the following run back while PSLs are positive, without
//! inspecting homes.
//!
//! ## Architecture
//!
//! ```text
//!   insert b (home 3), dist counts up while probing:
//!
//!   slot:   3     4     5     6
//!         [a:0] [x:0] [y:1] [ · ]       x, y home 4
//!           │     │
//!      dist 0    dist 1 > psl 0 → swap, carry x with dist 0
//!                       │     │
//!                  dist 1 ≤ 1 dist 2 → empty, place x
//!
//!         [a:0] [b:1] [y:1] [x:2]
//! ```
//!
//! ## Operations
//!
//! | Operation | Stops when                                             |
//! |-----------|--------------------------------------------------------|
//! | `find`    | match, empty slot, `dist > psl[slot]`, or `cap` probes |
//! | `insert`  | empty slot reached (after any number of swaps)         |
//! | `remove`  | next slot is empty or has PSL 0                        |

use crate::ds::{SlotArena, SlotId, bytes_eq};
use crate::error::InvariantError;
use crate::hash::fold_to_index;

use super::{
    Entry, SlotTable, check_slot_positions, entry_at, load_threshold, probe_distance, set_slot,
};

/// Robin Hood hash table with PSL-guided deletion.
#[derive(Debug)]
pub struct RobinHoodTable {
    slots: Vec<Option<SlotId>>,
    psl: Vec<u32>,
    load_factor_pct: u32,
    threshold: usize,
    len: usize,
    collisions: u64,
    resizes: u64,
}

impl RobinHoodTable {
    #[inline]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    #[inline]
    fn home_of<V>(&self, id: SlotId, entries: &SlotArena<Entry<V>>) -> usize {
        fold_to_index(entry_at(entries, id).hash(), self.slots.len())
    }

    /// PSL recorded at `slot`, or `None` if the slot is empty.
    pub fn psl_at(&self, slot: usize) -> Option<u32> {
        self.slots.get(slot)?.map(|_| self.psl[slot])
    }

    /// Looks `key` up and also reports how many steps past the home bucket
    /// the probe advanced before it stopped.
    fn probe<V>(
        &self,
        key: &[u8],
        hash: i32,
        entries: &SlotArena<Entry<V>>,
    ) -> (Option<usize>, usize) {
        let mask = self.mask();
        let mut slot = fold_to_index(hash, self.slots.len());
        for dist in 0..self.slots.len() {
            let Some(id) = self.slots[slot] else {
                return (None, dist);
            };
            if dist > self.psl[slot] as usize {
                return (None, dist);
            }
            let entry = entry_at(entries, id);
            if entry.hash() == hash && bytes_eq(entry.key().as_bytes(), key) {
                return (Some(slot), dist);
            }
            slot = (slot + 1) & mask;
        }
        (None, self.slots.len())
    }

    /// Places `id`, swapping with richer residents on the way. Returns the
    /// slot where `id` itself landed and whether that is not its home.
    fn place<V>(&mut self, id: SlotId, entries: &mut SlotArena<Entry<V>>) -> (usize, bool) {
        let mask = self.mask();
        let home = self.home_of(id, entries);
        let mut slot = home;
        let mut carry = id;
        let mut dist = 0u32;
        let mut landed = None;

        loop {
            match self.slots[slot] {
                None => {
                    self.slots[slot] = Some(carry);
                    self.psl[slot] = dist;
                    set_slot(entries, carry, slot);
                    landed.get_or_insert(slot);
                    break;
                },
                Some(resident) if dist > self.psl[slot] => {
                    self.slots[slot] = Some(carry);
                    std::mem::swap(&mut dist, &mut self.psl[slot]);
                    set_slot(entries, carry, slot);
                    landed.get_or_insert(slot);
                    carry = resident;
                },
                Some(_) => {},
            }
            slot = (slot + 1) & mask;
            dist += 1;
            debug_assert!(
                (dist as usize) <= self.slots.len(),
                "robin hood table has no free slot"
            );
        }

        self.len += 1;
        let landed = landed.unwrap_or(home);
        (landed, landed != home)
    }

    fn grow<V>(&mut self, entries: &mut SlotArena<Entry<V>>) {
        let old_capacity = self.slots.len();
        let new_capacity = old_capacity * 2;
        let old = std::mem::replace(&mut self.slots, vec![None; new_capacity]);
        self.psl = vec![0; new_capacity];
        self.threshold = load_threshold(new_capacity, self.load_factor_pct);
        self.len = 0;
        self.resizes += 1;

        for id in old.into_iter().flatten() {
            self.place(id, entries);
        }

        tracing::debug!(
            table = Self::NAME,
            old_capacity,
            new_capacity,
            len = self.len,
            "grew slot table"
        );
    }
}

impl SlotTable for RobinHoodTable {
    const NAME: &'static str = "robin-hood";

    fn with_capacity(capacity: usize, load_factor_pct: u32) -> Self {
        debug_assert!(capacity.is_power_of_two());
        debug_assert!((1..=100).contains(&load_factor_pct));
        Self {
            slots: vec![None; capacity],
            psl: vec![0; capacity],
            load_factor_pct,
            threshold: load_threshold(capacity, load_factor_pct),
            len: 0,
            collisions: 0,
            resizes: 0,
        }
    }

    fn initial_capacity(capacity_hint: usize, retention: usize) -> usize {
        capacity_hint.max(retention) * 2
    }

    fn find<V>(&self, key: &[u8], hash: i32, entries: &SlotArena<Entry<V>>) -> Option<usize> {
        self.probe(key, hash, entries).0
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
        while self.len >= self.threshold {
            self.grow(entries);
        }

        let id = entries.insert(entry);
        let (_, displaced) = self.place(id, entries);
        if displaced {
            self.collisions += 1;
        }
        Ok(id)
    }

    fn remove<V>(&mut self, slot: usize, entries: &mut SlotArena<Entry<V>>) -> Option<SlotId> {
        let id = self.slots.get_mut(slot)?.take()?;
        self.psl[slot] = 0;
        self.len -= 1;
        if let Some(entry) = entries.get_mut(id) {
            entry.slot = usize::MAX;
        }

        let mask = self.mask();
        let mut gap = slot;
        for _ in 0..self.slots.len() {
            let next = (gap + 1) & mask;
            match self.slots[next] {
                Some(moved) if self.psl[next] > 0 => {
                    self.slots[gap] = Some(moved);
                    self.psl[gap] = self.psl[next] - 1;
                    self.slots[next] = None;
                    self.psl[next] = 0;
                    set_slot(entries, moved, gap);
                    gap = next;
                },
                _ => break,
            }
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
        check_slot_positions(
            Self::NAME,
            self.slots
                .iter()
                .enumerate()
                .filter_map(|(slot, id)| id.map(|id| (slot, id))),
            self.len,
            entries,
        )?;

        if self.len > self.threshold {
            return Err(InvariantError::new(format!(
                "robin-hood: len {} exceeds threshold {}",
                self.len, self.threshold
            )));
        }

        let mask = self.mask();
        for (slot, id) in self.slots.iter().enumerate() {
            let Some(id) = *id else {
                if self.psl[slot] != 0 {
                    return Err(InvariantError::new(format!(
                        "robin-hood: empty slot {} has psl {}",
                        slot, self.psl[slot]
                    )));
                }
                continue;
            };

            let home = self.home_of(id, entries);
            let expected = probe_distance(home, slot, mask);
            if self.psl[slot] as usize != expected {
                return Err(InvariantError::new(format!(
                    "robin-hood: slot {} records psl {} but sits {} from home",
                    slot, self.psl[slot], expected
                )));
            }

            // A displaced entry must follow an occupied slot that is at most
            // one step poorer than itself.
            if self.psl[slot] > 0 {
                let prev = slot.wrapping_sub(1) & mask;
                if self.slots[prev].is_none() || self.psl[prev] + 1 < self.psl[slot] {
                    return Err(InvariantError::new(format!(
                        "robin-hood: ordering broken between slots {} and {}",
                        prev, slot
                    )));
                }
            }
        }
        Ok(())
    }
}
