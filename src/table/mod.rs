//! Slot tables: the collision-resolution strategies behind a retention map.
//!
//! A slot table only does index arithmetic. It stores [`SlotId`] handles
//! into the entry arena, keeps every entry's cached `slot` equal to its real
//! position, and grows by doubling. Lifecycle (active/inactive, retention,
//! eviction) lives one layer up in [`RetentionMap`](crate::map::RetentionMap).
//!
//! ## Strategies
//!
//! | Table                  | Collision handling               | Delete                  |
//! |------------------------|----------------------------------|-------------------------|
//! | [`ChainingTable`]      | index-linked chains + free list  | O(1) unlink             |
//! | [`LinearProbingTable`] | open addressing, no tombstones   | backward-shift compact  |
//! | [`RobinHoodTable`]     | open addressing, PSL ordering    | PSL-guided shift back   |
//!
//! ## Contract
//!
//! - `insert` rejects duplicates by handing the entry back, without growing
//! - `find` is bounded by the table capacity even at 100% load
//! - `remove` frees a slot and repairs the probe/chain structure around it
//! - collisions are counted for caller insertions that could not take their
//!   home bucket; rehash placements during growth are not counted

pub mod chaining;
pub mod linear_probing;
pub mod robin_hood;

pub use chaining::ChainingTable;
pub use linear_probing::LinearProbingTable;
pub use robin_hood::RobinHoodTable;

use crate::ds::{ByteKey, SlotArena, SlotId};
use crate::error::InvariantError;

/// Smallest table a map will allocate.
pub const MIN_CAPACITY: usize = 16;

/// Default load factor (percent) for the probing tables.
pub const DEFAULT_LOAD_FACTOR_PCT: u32 = 50;

/// A cached entry: key, payload and lifecycle state.
///
/// `slot` is the entry's current position in its table. It is rewritten
/// whenever the table relocates the entry (compaction, Robin Hood swap,
/// resize), so a previously observed value may be stale after any mutation;
/// look entries up by key instead of holding on to positions.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    key: ByteKey,
    value: V,
    hash: i32,
    slot: usize,
    active: bool,
}

impl<V> Entry<V> {
    pub(crate) fn new(key: ByteKey, value: V, hash: i32) -> Self {
        Self {
            key,
            value,
            hash,
            slot: usize::MAX,
            active: true,
        }
    }

    #[inline]
    pub fn key(&self) -> &ByteKey {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the 32-bit hash computed when the entry was inserted.
    #[inline]
    pub fn hash(&self) -> i32 {
        self.hash
    }

    /// Returns the entry's current table position.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Returns `true` until the entry is deactivated.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_inactive(&mut self) {
        self.active = false;
    }
}

/// Collision-resolution strategy over an arena of entries.
pub trait SlotTable: Sized {
    /// Short strategy name used in logs and metrics.
    const NAME: &'static str;

    /// Allocates an empty table. `capacity` is a power of two and at least
    /// [`MIN_CAPACITY`]; `load_factor_pct` is in `1..=100`.
    fn with_capacity(capacity: usize, load_factor_pct: u32) -> Self;

    /// Picks the initial table size for a map sized for `capacity_hint`
    /// active and `retention` inactive entries. Both inputs are already
    /// powers of two.
    fn initial_capacity(capacity_hint: usize, retention: usize) -> usize {
        let _ = retention;
        capacity_hint
    }

    /// Returns the position of `key`, if present.
    fn find<V>(&self, key: &[u8], hash: i32, entries: &SlotArena<Entry<V>>) -> Option<usize>;

    /// Inserts `entry` if its key is absent, growing first when needed.
    ///
    /// A duplicate key leaves the table untouched and hands `entry` back.
    fn insert<V>(
        &mut self,
        entry: Entry<V>,
        entries: &mut SlotArena<Entry<V>>,
    ) -> Result<SlotId, Entry<V>>;

    /// Frees `slot` and returns the handle that occupied it.
    fn remove<V>(&mut self, slot: usize, entries: &mut SlotArena<Entry<V>>) -> Option<SlotId>;

    /// Returns the handle stored at `slot`.
    fn id_at(&self, slot: usize) -> Option<SlotId>;

    /// Current table length (number of slots).
    fn capacity(&self) -> usize;

    /// Number of occupied slots.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Caller insertions that could not occupy their home bucket.
    fn collisions(&self) -> u64;

    /// Number of doublings since construction.
    fn resizes(&self) -> u64;

    /// Verifies the table's structural invariants against the arena.
    fn check_invariants<V>(&self, entries: &SlotArena<Entry<V>>) -> Result<(), InvariantError>;
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn entry_at<V>(entries: &SlotArena<Entry<V>>, id: SlotId) -> &Entry<V> {
    entries
        .get(id)
        .expect("slot table references a vacated arena entry")
}

#[inline]
pub(crate) fn set_slot<V>(entries: &mut SlotArena<Entry<V>>, id: SlotId, slot: usize) {
    entries
        .get_mut(id)
        .expect("slot table references a vacated arena entry")
        .slot = slot;
}

/// Rounds a user capacity hint up to a power of two no smaller than
/// [`MIN_CAPACITY`].
pub fn normalize_capacity(capacity_hint: usize) -> usize {
    capacity_hint.max(MIN_CAPACITY).next_power_of_two()
}

/// Growth threshold for the probing tables: the occupancy at which the next
/// insertion doubles the table first. Never below one slot.
#[inline]
pub(crate) fn load_threshold(capacity: usize, load_factor_pct: u32) -> usize {
    ((capacity as u128 * load_factor_pct as u128 / 100) as usize).max(1)
}

/// Returns `true` if `x` lies in the cyclic half-open interval `(lo, hi]`.
///
/// When `lo == hi` the interval is empty.
#[inline]
pub(crate) fn in_cyclic_range(x: usize, lo: usize, hi: usize) -> bool {
    if lo <= hi {
        lo < x && x <= hi
    } else {
        x > lo || x <= hi
    }
}

/// Cyclic distance walked from `home` forward to `slot`.
#[inline]
pub(crate) fn probe_distance(home: usize, slot: usize, mask: usize) -> usize {
    slot.wrapping_sub(home) & mask
}

/// Checks that every occupied slot points at a live entry whose cached
/// position is that slot, and that the occupied count matches `len`.
pub(crate) fn check_slot_positions<V>(
    name: &str,
    slots: impl Iterator<Item = (usize, SlotId)>,
    len: usize,
    entries: &SlotArena<Entry<V>>,
) -> Result<(), InvariantError> {
    let mut seen = rustc_hash::FxHashSet::default();
    let mut occupied = 0;
    for (slot, id) in slots {
        occupied += 1;
        let entry = entries.get(id).ok_or_else(|| {
            InvariantError::new(format!("{}: slot {} holds stale handle {:?}", name, slot, id))
        })?;
        if entry.slot != slot {
            return Err(InvariantError::new(format!(
                "{}: entry {:?} sits at slot {} but caches slot {}",
                name, entry.key, slot, entry.slot
            )));
        }
        if !seen.insert(entry.key.as_bytes()) {
            return Err(InvariantError::new(format!(
                "{}: key {:?} stored twice",
                name, entry.key
            )));
        }
    }
    if occupied != len {
        return Err(InvariantError::new(format!(
            "{}: {} occupied slots but len is {}",
            name, occupied, len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_capacity_rounds_up() {
        assert_eq!(normalize_capacity(0), 16);
        assert_eq!(normalize_capacity(16), 16);
        assert_eq!(normalize_capacity(17), 32);
        assert_eq!(normalize_capacity(1000), 1024);
    }

    #[test]
    fn load_threshold_never_zero() {
        assert_eq!(load_threshold(32, 50), 16);
        assert_eq!(load_threshold(16, 100), 16);
        assert_eq!(load_threshold(16, 1), 1);
        assert_eq!(load_threshold(1024, 75), 768);
    }

    #[test]
    fn cyclic_range_with_and_without_wrap() {
        // (3, 7]
        assert!(!in_cyclic_range(3, 3, 7));
        assert!(in_cyclic_range(4, 3, 7));
        assert!(in_cyclic_range(7, 3, 7));
        assert!(!in_cyclic_range(8, 3, 7));
        // (14, 1] wraps through 15, 0, 1
        assert!(in_cyclic_range(15, 14, 1));
        assert!(in_cyclic_range(0, 14, 1));
        assert!(in_cyclic_range(1, 14, 1));
        assert!(!in_cyclic_range(14, 14, 1));
        assert!(!in_cyclic_range(2, 14, 1));
        // Empty interval
        assert!(!in_cyclic_range(5, 5, 5));
    }

    #[test]
    fn probe_distance_wraps() {
        assert_eq!(probe_distance(3, 3, 15), 0);
        assert_eq!(probe_distance(3, 6, 15), 3);
        assert_eq!(probe_distance(14, 1, 15), 3);
    }

    #[test]
    fn entry_starts_active_without_position() {
        let entry = Entry::new(ByteKey::from("A"), 7u32, 65);
        assert!(entry.is_active());
        assert_eq!(entry.slot(), usize::MAX);
        assert_eq!(entry.hash(), 65);
        assert_eq!(*entry.value(), 7);
        assert_eq!(entry.key(), &ByteKey::from("A"));
    }
}

/// Shared test helpers for the table modules.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::hash::HashFunction;

    /// Inserts `key` hashed with `hasher`, returning whether it was new.
    pub fn put<T: SlotTable, H: HashFunction>(
        table: &mut T,
        entries: &mut SlotArena<Entry<u32>>,
        hasher: &H,
        key: &str,
        value: u32,
    ) -> bool {
        let hash = hasher.hash(key.as_bytes());
        table
            .insert(Entry::new(ByteKey::from(key), value, hash), entries)
            .is_ok()
    }

    /// Looks `key` up and returns its value.
    pub fn lookup<T: SlotTable, H: HashFunction>(
        table: &T,
        entries: &SlotArena<Entry<u32>>,
        hasher: &H,
        key: &str,
    ) -> Option<u32> {
        let hash = hasher.hash(key.as_bytes());
        table
            .find(key.as_bytes(), hash, entries)
            .and_then(|slot| table.id_at(slot))
            .map(|id| *entry_at(entries, id).value())
    }

    /// Removes `key` from the table and the arena.
    pub fn delete<T: SlotTable, H: HashFunction>(
        table: &mut T,
        entries: &mut SlotArena<Entry<u32>>,
        hasher: &H,
        key: &str,
    ) -> bool {
        let hash = hasher.hash(key.as_bytes());
        let Some(slot) = table.find(key.as_bytes(), hash, entries) else {
            return false;
        };
        let id = table.remove(slot, entries).expect("found slot must be occupied");
        entries.remove(id).is_some()
    }

    /// Home bucket is the key's first byte: lets tests place keys exactly.
    pub fn first_byte(key: &[u8]) -> i32 {
        key.first().copied().map(i32::from).unwrap_or(0)
    }

    /// Builds a key whose first byte selects home bucket `home`.
    pub fn key_in(home: u8, tag: &str) -> String {
        let mut key = String::with_capacity(tag.len() + 1);
        key.push(char::from(home));
        key.push_str(tag);
        key
    }

    /// Squeezes keys into eight home buckets so probes wrap and chains form.
    pub fn clustered(key: &[u8]) -> i32 {
        crate::hash::Polynomial31.hash(key) & 0x7
    }

    #[derive(Debug, Clone, Copy)]
    pub enum TableOp {
        Put(u8),
        Delete(u8),
    }

    pub fn table_op() -> impl proptest::strategy::Strategy<Value = TableOp> {
        use proptest::prelude::*;
        prop_oneof![
            3 => (0u8..48).prop_map(TableOp::Put),
            2 => (0u8..48).prop_map(TableOp::Delete),
        ]
    }

    /// Replays `ops` against a fresh table and a `BTreeMap` model, checking
    /// lookups and structural invariants after every step.
    pub fn check_against_model<T: SlotTable>(
        load_factor_pct: u32,
        ops: &[TableOp],
    ) -> Result<(), proptest::test_runner::TestCaseError> {
        use proptest::prelude::*;
        use std::collections::BTreeMap;

        let mut table = T::with_capacity(MIN_CAPACITY, load_factor_pct);
        let mut entries = SlotArena::new();
        let mut model = BTreeMap::new();

        for (step, op) in ops.iter().enumerate() {
            match *op {
                TableOp::Put(k) => {
                    let key = format!("k{}", k);
                    let fresh = put(&mut table, &mut entries, &clustered, &key, step as u32);
                    prop_assert_eq!(fresh, !model.contains_key(&k));
                    model.entry(k).or_insert(step as u32);
                },
                TableOp::Delete(k) => {
                    let key = format!("k{}", k);
                    let removed = delete(&mut table, &mut entries, &clustered, &key);
                    prop_assert_eq!(removed, model.remove(&k).is_some());
                },
            }

            prop_assert_eq!(table.len(), model.len());
            prop_assert_eq!(entries.len(), model.len());
            if let Err(err) = table.check_invariants(&entries) {
                return Err(TestCaseError::fail(err.to_string()));
            }
        }

        for k in 0u8..48 {
            let key = format!("k{}", k);
            prop_assert_eq!(
                lookup(&table, &entries, &clustered, &key),
                model.get(&k).copied()
            );
        }
        Ok(())
    }
}
