//! # Retention Cache Trait
//!
//! The lifecycle contract shared by every collision strategy and by the
//! runtime-selected [`Cache`](crate::builder::Cache).
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────────────────────┐
//!                    │             RetentionCache<V>               │
//!                    │                                             │
//!                    │  put_if_empty(&mut, key, V) → bool          │
//!                    │  get(&, &key) → Option<&Entry<V>>           │
//!                    │  deactivate(&mut, &key) → Result<(), _>     │
//!                    │  contains / len / is_empty / capacity       │
//!                    │  collision_count / inactive_len             │
//!                    │  retention_capacity                         │
//!                    └──────────────────────┬──────────────────────┘
//!                                           │
//!            ┌──────────────────────────────┼──────────────────────────────┐
//!            ▼                              ▼                              ▼
//!   ┌─────────────────┐          ┌──────────────────────┐       ┌─────────────────┐
//!   │  ChainingMap<V> │          │ LinearProbingMap<V>  │       │ RobinHoodMap<V> │
//!   └─────────────────┘          └──────────────────────┘       └─────────────────┘
//!                                           ▲
//!                                           │ match dispatch
//!                                   ┌───────┴───────┐
//!                                   │   Cache<V>    │
//!                                   └───────────────┘
//! ```
//!
//! ## State Machine
//!
//! ```text
//!   Absent ──put_if_empty──► Active ──deactivate──► Inactive
//!     ▲                                                │
//!     └──────────── evicted when the window is full ───┘
//! ```
//!
//! There is no Inactive → Active transition and no standalone delete:
//! `put_if_empty` on an Inactive key is a duplicate, and the only way out
//! of the cache is eviction from the retention window.
//!
//! ## Example Usage
//!
//! ```
//! use retirekit::map::{ChainingMap, RobinHoodMap};
//! use retirekit::traits::RetentionCache;
//!
//! fn retire_all<C: RetentionCache<u32>>(cache: &mut C, keys: &[&str]) {
//!     for (i, key) in keys.iter().enumerate() {
//!         cache.put_if_empty(*key, i as u32);
//!         cache.deactivate(*key).unwrap();
//!     }
//! }
//!
//! let mut a: ChainingMap<u32> = ChainingMap::new(16, 2);
//! let mut b: RobinHoodMap<u32> = RobinHoodMap::new(16, 2);
//! retire_all(&mut a, &["x", "y", "z"]);
//! retire_all(&mut b, &["x", "y", "z"]);
//! assert_eq!(a.len(), 2);
//! assert_eq!(b.len(), 2);
//! ```

use crate::ds::ByteKey;
use crate::error::ContractViolation;
use crate::table::Entry;

/// Active/inactive cache with a bounded retention window.
pub trait RetentionCache<V> {
    /// Inserts `key` as Active iff it is absent in every state.
    fn put_if_empty(&mut self, key: impl Into<ByteKey>, value: V) -> bool;

    /// Looks up `key` regardless of state.
    fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&Entry<V>>;

    /// Moves an Active `key` into the retention window, evicting the oldest
    /// inactive entry first if the window is full.
    fn deactivate<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Result<(), ContractViolation>;

    /// Insertions that could not occupy their home bucket.
    fn collision_count(&self) -> u64;

    /// Current table length.
    fn capacity(&self) -> usize;

    /// Resident entries, Active and Inactive.
    fn len(&self) -> usize;

    fn inactive_len(&self) -> usize;

    fn retention_capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}
