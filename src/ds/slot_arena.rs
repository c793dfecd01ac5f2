//! Entry arena with stable handles.
//!
//! Slot tables move entries around (backward-shift compaction, Robin Hood
//! swaps, resize), so a table position is not a stable name for an entry.
//! The arena owns the entries instead and hands out a [`SlotId`] that stays
//! valid until the entry is removed. Tables store `SlotId`s; the retention
//! queue stores `SlotId`s; each entry caches its current table position.
//!
//! ```text
//!   table slots:   [ · ][id2][ · ][id0][id1][ · ] ...
//!                         │         │    │
//!   arena:         id0 ───┼─────────┘    │        entry.slot == table position
//!                  id1 ───┼──────────────┘
//!                  id2 ───┘
//!   retention:     [id0, id2]                      (oldest first)
//! ```
//!
//! Removed ids go on a free list and are reused by the next insert, so the
//! arena's footprint tracks the peak live population.

/// Stable handle to an arena entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) u32);

impl SlotId {
    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Vector-backed arena with a free list of vacated ids.
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> SlotArena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty arena with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value`, reusing a vacated id when one is available.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` entries are live at once.
    pub fn insert(&mut self, value: T) -> SlotId {
        let id = match self.free.pop() {
            Some(id) => {
                debug_assert!(self.slots[id as usize].is_none());
                self.slots[id as usize] = Some(value);
                id
            },
            None => {
                let id = u32::try_from(self.slots.len()).expect("slot arena exhausted u32 ids");
                self.slots.push(Some(value));
                id
            },
        };
        self.len += 1;
        SlotId(id)
    }

    /// Removes and returns the entry behind `id`.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.index())?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(value)
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates live entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|value| (SlotId(idx as u32), value)))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
