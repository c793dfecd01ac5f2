//! Runtime strategy selection for retention caches.
//!
//! The concrete maps ([`ChainingMap`], [`LinearProbingMap`],
//! [`RobinHoodMap`]) are chosen at compile time. [`CacheBuilder`] picks one
//! from a [`Strategy`] value instead, which is what configuration files and
//! benchmark sweeps need, and wraps it in a [`Cache`] that dispatches by
//! `match`.
//!
//! ## Example
//!
//! ```rust
//! use retirekit::builder::{CacheBuilder, Strategy};
//! use retirekit::hash::MetroHash64;
//!
//! let strategy: Strategy = "robin-hood".parse().unwrap();
//! let mut cache = CacheBuilder::new(1024)
//!     .retention(64)
//!     .load_factor(75)
//!     .hasher(MetroHash64)
//!     .build::<String>(strategy);
//!
//! assert!(cache.put_if_empty("E-1", "hello".to_string()));
//! cache.deactivate("E-1").unwrap();
//! assert_eq!(cache.get("E-1").map(|e| e.value().as_str()), Some("hello"));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::ds::ByteKey;
use crate::error::{ConfigError, ContractViolation, InvariantError};
use crate::hash::{HashFunction, Polynomial31};
use crate::map::{ChainingMap, LinearProbingMap, RobinHoodMap};
use crate::table::{DEFAULT_LOAD_FACTOR_PCT, Entry};
use crate::traits::RetentionCache;

/// Available collision-resolution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Separate chaining with an index-linked free list.
    Chaining,
    /// Linear probing with backward-shift deletion.
    LinearProbing,
    /// Robin Hood probing with PSL tracking.
    RobinHood,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Strategy; 3] = [
        Strategy::Chaining,
        Strategy::LinearProbing,
        Strategy::RobinHood,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Chaining => "chaining",
            Strategy::LinearProbing => "linear-probing",
            Strategy::RobinHood => "robin-hood",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "unknown strategy {:?} (expected chaining, linear-probing or robin-hood)",
                    s
                ))
            })
    }
}

/// Retention cache with its strategy chosen at runtime.
#[derive(Debug)]
pub struct Cache<V, H = Polynomial31> {
    inner: CacheInner<V, H>,
}

#[derive(Debug)]
enum CacheInner<V, H> {
    Chaining(ChainingMap<V, H>),
    LinearProbing(LinearProbingMap<V, H>),
    RobinHood(RobinHoodMap<V, H>),
}

/// Forwards a call to whichever map the cache wraps.
macro_rules! dispatch {
    ($self:expr, $map:ident => $body:expr) => {
        match $self {
            CacheInner::Chaining($map) => $body,
            CacheInner::LinearProbing($map) => $body,
            CacheInner::RobinHood($map) => $body,
        }
    };
}

impl<V, H: HashFunction> Cache<V, H> {
    /// Inserts `key` as Active if absent. See
    /// [`RetentionMap::put_if_empty`](crate::map::RetentionMap::put_if_empty).
    pub fn put_if_empty(&mut self, key: impl Into<ByteKey>, value: V) -> bool {
        dispatch!(&mut self.inner, map => map.put_if_empty(key, value))
    }

    /// Looks up `key` in either state.
    pub fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&Entry<V>> {
        dispatch!(&self.inner, map => map.get(key))
    }

    pub fn contains<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        dispatch!(&self.inner, map => map.contains(key))
    }

    /// Moves an Active entry into the retention window.
    pub fn deactivate<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Result<(), ContractViolation> {
        dispatch!(&mut self.inner, map => map.deactivate(key))
    }

    pub fn len(&self) -> usize {
        dispatch!(&self.inner, map => map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current table length (number of slots).
    pub fn capacity(&self) -> usize {
        dispatch!(&self.inner, map => map.capacity())
    }

    pub fn collision_count(&self) -> u64 {
        dispatch!(&self.inner, map => map.collision_count())
    }

    pub fn inactive_len(&self) -> usize {
        dispatch!(&self.inner, map => map.inactive_len())
    }

    pub fn retention_capacity(&self) -> usize {
        dispatch!(&self.inner, map => map.retention_capacity())
    }

    /// Strategy this cache was built with.
    pub fn strategy(&self) -> Strategy {
        match self.inner {
            CacheInner::Chaining(_) => Strategy::Chaining,
            CacheInner::LinearProbing(_) => Strategy::LinearProbing,
            CacheInner::RobinHood(_) => Strategy::RobinHood,
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        dispatch!(&self.inner, map => map.check_invariants())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> crate::metrics::RetentionMetricsSnapshot {
        dispatch!(&self.inner, map => map.metrics_snapshot())
    }
}

impl<V, H: HashFunction> RetentionCache<V> for Cache<V, H> {
    fn put_if_empty(&mut self, key: impl Into<ByteKey>, value: V) -> bool {
        Cache::put_if_empty(self, key, value)
    }

    fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&Entry<V>> {
        Cache::get(self, key)
    }

    fn deactivate<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Result<(), ContractViolation> {
        Cache::deactivate(self, key)
    }

    fn collision_count(&self) -> u64 {
        Cache::collision_count(self)
    }

    fn capacity(&self) -> usize {
        Cache::capacity(self)
    }

    fn len(&self) -> usize {
        Cache::len(self)
    }

    fn inactive_len(&self) -> usize {
        Cache::inactive_len(self)
    }

    fn retention_capacity(&self) -> usize {
        Cache::retention_capacity(self)
    }
}

/// Builder for [`Cache`] instances.
#[derive(Debug, Clone)]
pub struct CacheBuilder<H = Polynomial31> {
    capacity_hint: usize,
    retention: usize,
    load_factor_pct: u32,
    hasher: H,
}

impl CacheBuilder {
    /// Starts a builder for roughly `capacity_hint` active entries, with a
    /// retention window of 1, a 50% load factor and [`Polynomial31`].
    pub fn new(capacity_hint: usize) -> Self {
        Self {
            capacity_hint,
            retention: 1,
            load_factor_pct: DEFAULT_LOAD_FACTOR_PCT,
            hasher: Polynomial31,
        }
    }
}

impl<H: HashFunction> CacheBuilder<H> {
    /// Sets the retention window size (must be a power of two).
    pub fn retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    /// Sets the probing tables' load factor in percent, `1..=100`.
    /// Chaining ignores it.
    pub fn load_factor(mut self, load_factor_pct: u32) -> Self {
        self.load_factor_pct = load_factor_pct;
        self
    }

    /// Replaces the hash function.
    pub fn hasher<H2: HashFunction>(self, hasher: H2) -> CacheBuilder<H2> {
        CacheBuilder {
            capacity_hint: self.capacity_hint,
            retention: self.retention,
            load_factor_pct: self.load_factor_pct,
            hasher,
        }
    }

    /// Builds a cache, returning an error on invalid configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] under the same conditions as
    /// [`RetentionMap::try_new`](crate::map::RetentionMap::try_new).
    pub fn try_build<V>(self, strategy: Strategy) -> Result<Cache<V, H>, ConfigError> {
        let Self {
            capacity_hint,
            retention,
            load_factor_pct,
            hasher,
        } = self;

        let inner = match strategy {
            Strategy::Chaining => CacheInner::Chaining(ChainingMap::try_new(
                capacity_hint,
                retention,
                hasher,
                load_factor_pct,
            )?),
            Strategy::LinearProbing => CacheInner::LinearProbing(LinearProbingMap::try_new(
                capacity_hint,
                retention,
                hasher,
                load_factor_pct,
            )?),
            Strategy::RobinHood => CacheInner::RobinHood(RobinHoodMap::try_new(
                capacity_hint,
                retention,
                hasher,
                load_factor_pct,
            )?),
        };

        Ok(Cache { inner })
    }

    /// Builds a cache.
    ///
    /// # Panics
    ///
    /// Panics on invalid configuration. See [`try_build`](Self::try_build).
    pub fn build<V>(self, strategy: Strategy) -> Cache<V, H> {
        match self.try_build(strategy) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }
}
