//! Retention map: an active/inactive key-value cache over a slot table.
//!
//! Entries are inserted active and stay resident until the caller
//! deactivates them. Deactivated entries remain readable inside a bounded
//! FIFO retention window; once the window is full, each further deactivation
//! evicts the oldest inactive entry first. Active entries are never evicted.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │ RetentionMap<V, T, H>                                             │
//!   │                                                                   │
//!   │   hasher: H ──► hash(key) ──► table.find / table.insert           │
//!   │                                                                   │
//!   │   table: T (SlotTable)     entries: SlotArena<Entry<V>>           │
//!   │   ┌──┬──┬──┬──┬──┐         ┌────────────────────────────┐         │
//!   │   │  │id│  │id│  │ ──────► │ key, value, hash, slot,    │         │
//!   │   └──┴──┴──┴──┴──┘         │ active                     │         │
//!   │                            └────────────────────────────┘         │
//!   │                                       ▲                           │
//!   │   retention: RetentionQueue<SlotId> ──┘  (inactive ids, oldest    │
//!   │                                           first)                  │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//!   put_if_empty ──► Active ──deactivate──► Inactive ──(window full,
//!                                                      oldest)──► evicted
//! ```
//!
//! ## Operations
//!
//! | Operation      | Effect                                                   |
//! |----------------|----------------------------------------------------------|
//! | `put_if_empty` | insert as Active iff the key is absent (any state)       |
//! | `get`          | read in any state, no lifecycle change                   |
//! | `deactivate`   | Active → Inactive, evicting the oldest inactive if full  |
//!
//! ## Example Usage
//!
//! ```
//! use retirekit::map::LinearProbingMap;
//!
//! let mut orders: LinearProbingMap<u64> = LinearProbingMap::new(16, 2);
//!
//! assert!(orders.put_if_empty("O1", 100));
//! assert!(orders.put_if_empty("O2", 200));
//! assert!(orders.put_if_empty("O3", 300));
//! assert!(!orders.put_if_empty("O1", 999));
//!
//! orders.deactivate("O1").unwrap();
//! orders.deactivate("O2").unwrap();
//! assert_eq!(orders.len(), 3);
//!
//! // Retention window holds two: O1 is evicted to make room for O3
//! orders.deactivate("O3").unwrap();
//! assert!(orders.get("O1").is_none());
//! assert!(!orders.get("O3").unwrap().is_active());
//! assert_eq!(orders.len(), 2);
//! ```

use crate::ds::{ByteKey, RetentionQueue, SlotArena, SlotId};
use crate::error::{ConfigError, ContractViolation, InvariantError};
use crate::hash::{HashFunction, Polynomial31};
use crate::table::{
    ChainingTable, DEFAULT_LOAD_FACTOR_PCT, Entry, LinearProbingTable, RobinHoodTable, SlotTable,
    normalize_capacity,
};
use crate::traits::RetentionCache;

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::RetentionMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::RetentionMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    MetricsReset, MetricsSnapshotProvider, RetentionMetricsReadRecorder, RetentionMetricsRecorder,
};

/// Largest accepted capacity hint or retention size.
pub const MAX_CAPACITY: usize = 1 << 30;

/// Retention map over separate chaining.
pub type ChainingMap<V, H = Polynomial31> = RetentionMap<V, ChainingTable, H>;

/// Retention map over linear probing with backward-shift deletion.
pub type LinearProbingMap<V, H = Polynomial31> = RetentionMap<V, LinearProbingTable, H>;

/// Retention map over Robin Hood probing.
pub type RobinHoodMap<V, H = Polynomial31> = RetentionMap<V, RobinHoodTable, H>;

/// Active/inactive cache generic over its collision strategy `T` and hash
/// function `H`.
#[derive(Debug)]
pub struct RetentionMap<V, T, H = Polynomial31> {
    table: T,
    entries: SlotArena<Entry<V>>,
    retention: RetentionQueue<SlotId>,
    hasher: H,
    #[cfg(feature = "metrics")]
    metrics: RetentionMetrics,
}

impl<V, T, H> RetentionMap<V, T, H>
where
    T: SlotTable,
    H: HashFunction + Default,
{
    /// Creates a map with the default hash function and load factor.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. See [`try_new`](Self::try_new).
    pub fn new(capacity_hint: usize, retention: usize) -> Self {
        Self::with_hasher(capacity_hint, retention, H::default())
    }
}

impl<V, T, H> RetentionMap<V, T, H>
where
    T: SlotTable,
    H: HashFunction,
{
    /// Creates a map using `hasher` and the default load factor.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. See [`try_new`](Self::try_new).
    pub fn with_hasher(capacity_hint: usize, retention: usize, hasher: H) -> Self {
        match Self::try_new(capacity_hint, retention, hasher, DEFAULT_LOAD_FACTOR_PCT) {
            Ok(map) => map,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a map, returning an error on invalid parameters.
    ///
    /// `capacity_hint` is rounded up to a power of two of at least 16.
    /// Probing tables start with `2 * max(hint, retention)` slots so both
    /// populations fit under the default load factor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `retention` is not a power of two, either
    /// size exceeds [`MAX_CAPACITY`], or `load_factor_pct` is outside
    /// `1..=100`.
    pub fn try_new(
        capacity_hint: usize,
        retention: usize,
        hasher: H,
        load_factor_pct: u32,
    ) -> Result<Self, ConfigError> {
        if !retention.is_power_of_two() {
            return Err(ConfigError::new(format!(
                "retention capacity must be a power of two, got {}",
                retention
            )));
        }
        if retention > MAX_CAPACITY {
            return Err(ConfigError::new(format!(
                "retention capacity must be at most {}, got {}",
                MAX_CAPACITY, retention
            )));
        }
        if capacity_hint > MAX_CAPACITY {
            return Err(ConfigError::new(format!(
                "capacity hint must be at most {}, got {}",
                MAX_CAPACITY, capacity_hint
            )));
        }
        if !(1..=100).contains(&load_factor_pct) {
            return Err(ConfigError::new(format!(
                "load factor must be in 1..=100 percent, got {}",
                load_factor_pct
            )));
        }

        let capacity = T::initial_capacity(normalize_capacity(capacity_hint), retention);
        Ok(Self {
            table: T::with_capacity(capacity, load_factor_pct),
            entries: SlotArena::with_capacity(capacity_hint.max(retention)),
            retention: RetentionQueue::try_new(retention)?,
            hasher,
            #[cfg(feature = "metrics")]
            metrics: RetentionMetrics::default(),
        })
    }

    /// Inserts `key` as an Active entry if it is absent.
    ///
    /// Returns `false` without touching the map (no resize either) when the
    /// key is already present, Active or Inactive.
    pub fn put_if_empty(&mut self, key: impl Into<ByteKey>, value: V) -> bool {
        let key = key.into();
        let hash = self.hasher.hash(key.as_bytes());
        let inserted = self
            .table
            .insert(Entry::new(key, value, hash), &mut self.entries)
            .is_ok();

        #[cfg(feature = "metrics")]
        {
            if inserted {
                self.metrics.record_put_new();
            } else {
                self.metrics.record_put_duplicate();
            }
        }

        inserted
    }

    /// Looks up `key` in either state.
    pub fn get<K>(&self, key: &K) -> Option<&Entry<V>>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let found = self.lookup(key.as_ref()).and_then(|id| self.entries.get(id));

        #[cfg(feature = "metrics")]
        {
            if found.is_some() {
                self.metrics.record_get_hit();
            } else {
                self.metrics.record_get_miss();
            }
        }

        found
    }

    /// Returns `true` if `key` is present in either state.
    pub fn contains<K>(&self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.lookup(key.as_ref()).is_some()
    }

    /// Moves an Active entry into the retention window.
    ///
    /// If the window is full its oldest member is evicted first (removed
    /// from the table and dropped), then `key` joins the tail.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation`] without mutating anything if `key` is
    /// absent or already inactive.
    pub fn deactivate<K>(&mut self, key: &K) -> Result<(), ContractViolation>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        let Some(id) = self.lookup(key) else {
            return Err(self.reject(key, "is not present"));
        };
        if !self.entry(id).is_active() {
            return Err(self.reject(key, "is already inactive"));
        }

        if self.retention.is_full() {
            self.evict_oldest();
        }
        let queued = self.retention.put(id).is_ok();
        debug_assert!(queued, "retention queue full after eviction");
        if let Some(entry) = self.entries.get_mut(id) {
            entry.set_inactive();
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_deactivate();

        Ok(())
    }

    /// Number of resident entries (Active + Inactive).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current table length (number of slots).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Insertions that could not occupy their home bucket.
    #[inline]
    pub fn collision_count(&self) -> u64 {
        self.table.collisions()
    }

    /// Number of times the table has doubled.
    #[inline]
    pub fn resize_count(&self) -> u64 {
        self.table.resizes()
    }

    /// Number of entries in the retention window.
    #[inline]
    pub fn inactive_len(&self) -> usize {
        self.retention.len()
    }

    /// Number of active entries.
    #[inline]
    pub fn active_len(&self) -> usize {
        self.len() - self.inactive_len()
    }

    /// Maximum number of inactive entries kept.
    #[inline]
    pub fn retention_capacity(&self) -> usize {
        self.retention.capacity()
    }

    /// Name of the collision strategy.
    #[inline]
    pub fn strategy_name(&self) -> &'static str {
        T::NAME
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Iterates inactive keys, oldest (next to be evicted) first.
    pub fn inactive_keys(&self) -> impl Iterator<Item = &ByteKey> + '_ {
        self.retention.iter().map(|&id| self.entry(id).key())
    }

    /// Iterates every resident entry in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<V>> + '_ {
        self.entries.iter().map(|(_, entry)| entry)
    }

    /// Verifies table structure and lifecycle bookkeeping.
    ///
    /// Checks that the table and arena agree, that exactly the queued
    /// entries are inactive, that the queue holds no duplicates and stays
    /// within its capacity.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.table.check_invariants(&self.entries)?;

        if self.table.len() != self.entries.len() {
            return Err(InvariantError::new(format!(
                "table holds {} entries but arena holds {}",
                self.table.len(),
                self.entries.len()
            )));
        }
        if self.retention.len() > self.retention.capacity() {
            return Err(InvariantError::new("retention queue over capacity"));
        }

        let mut queued = rustc_hash::FxHashSet::default();
        for &id in self.retention.iter() {
            let entry = self.entries.get(id).ok_or_else(|| {
                InvariantError::new(format!("retention queue holds stale handle {:?}", id))
            })?;
            if entry.is_active() {
                return Err(InvariantError::new(format!(
                    "queued entry {:?} is still active",
                    entry.key()
                )));
            }
            if !queued.insert(id) {
                return Err(InvariantError::new(format!(
                    "entry {:?} queued twice",
                    entry.key()
                )));
            }
        }

        let inactive = self.entries.iter().filter(|(_, e)| !e.is_active()).count();
        if inactive != queued.len() {
            return Err(InvariantError::new(format!(
                "{} inactive entries but {} queued",
                inactive,
                queued.len()
            )));
        }
        Ok(())
    }

    /// Panics if [`check_invariants`](Self::check_invariants) fails.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{}", err);
        }
        self.retention.debug_validate_invariants();
    }

    #[inline]
    fn lookup(&self, key: &[u8]) -> Option<SlotId> {
        let hash = self.hasher.hash(key);
        let slot = self.table.find(key, hash, &self.entries)?;
        self.table.id_at(slot)
    }

    #[inline]
    fn entry(&self, id: SlotId) -> &Entry<V> {
        self.entries
            .get(id)
            .expect("table/arena out of sync")
    }

    fn evict_oldest(&mut self) {
        let Some(id) = self.retention.take() else {
            return;
        };
        let slot = self.entry(id).slot();
        let removed = self.table.remove(slot, &mut self.entries);
        debug_assert_eq!(removed, Some(id), "evicted entry was not at its slot");

        if let Some(entry) = self.entries.remove(id) {
            tracing::trace!(
                table = T::NAME,
                key = %entry.key(),
                slot,
                "evicted oldest inactive entry"
            );
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_eviction();
    }

    fn reject(&mut self, key: &[u8], reason: &str) -> ContractViolation {
        let key = String::from_utf8_lossy(key);
        tracing::debug!(table = T::NAME, key = %key, reason, "rejected deactivate");

        #[cfg(feature = "metrics")]
        self.metrics.record_deactivate_rejected();

        ContractViolation::new(format!("deactivate: key {:?} {}", key, reason))
    }
}

#[cfg(feature = "metrics")]
impl<V, T, H> RetentionMap<V, T, H>
where
    T: SlotTable,
    H: HashFunction,
{
    pub fn metrics(&self) -> &RetentionMetrics {
        &self.metrics
    }

    pub fn metrics_snapshot(&self) -> RetentionMetricsSnapshot {
        RetentionMetricsSnapshot {
            put_calls: self.metrics.put_calls,
            put_new: self.metrics.put_new,
            put_duplicate: self.metrics.put_duplicate,
            get_calls: self.metrics.get_calls.get(),
            get_hits: self.metrics.get_hits.get(),
            get_misses: self.metrics.get_misses.get(),
            deactivate_calls: self.metrics.deactivate_calls,
            deactivate_rejected: self.metrics.deactivate_rejected,
            evictions: self.metrics.evictions,
            len: self.len(),
            inactive_len: self.inactive_len(),
            capacity: self.capacity(),
            retention_capacity: self.retention_capacity(),
            collisions: self.collision_count(),
            resizes: self.resize_count(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<V, T, H> MetricsSnapshotProvider<RetentionMetricsSnapshot> for RetentionMap<V, T, H>
where
    T: SlotTable,
    H: HashFunction,
{
    fn snapshot(&self) -> RetentionMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<V, T, H> MetricsReset for RetentionMap<V, T, H> {
    fn reset_metrics(&mut self) {
        self.metrics = RetentionMetrics::default();
    }
}

impl<V, T, H> RetentionCache<V> for RetentionMap<V, T, H>
where
    T: SlotTable,
    H: HashFunction,
{
    fn put_if_empty(&mut self, key: impl Into<ByteKey>, value: V) -> bool {
        RetentionMap::put_if_empty(self, key, value)
    }

    fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&Entry<V>> {
        RetentionMap::get(self, key)
    }

    fn deactivate<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Result<(), ContractViolation> {
        RetentionMap::deactivate(self, key)
    }

    fn collision_count(&self) -> u64 {
        RetentionMap::collision_count(self)
    }

    fn capacity(&self) -> usize {
        RetentionMap::capacity(self)
    }

    fn len(&self) -> usize {
        RetentionMap::len(self)
    }

    fn inactive_len(&self) -> usize {
        RetentionMap::inactive_len(self)
    }

    fn retention_capacity(&self) -> usize {
        RetentionMap::retention_capacity(self)
    }
}
