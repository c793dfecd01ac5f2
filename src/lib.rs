//! retirekit: bounded active/inactive key-value caches over pluggable
//! open-addressing and chaining tables.
//!
//! Keys enter a cache *active*, are later *deactivated* (retired but still
//! readable) and live on only inside a fixed-size FIFO retention window.
//! Three collision strategies share one lifecycle engine:
//!
//! - [`ChainingMap`]: separate chaining over index-linked arrays
//! - [`LinearProbingMap`]: linear probing with backward-shift deletion
//! - [`RobinHoodMap`]: Robin Hood probing with PSL-guided deletion
//!
//! [`CacheBuilder`](builder::CacheBuilder) selects a strategy at runtime.

pub mod builder;
pub mod ds;
pub mod error;
pub mod hash;
pub mod map;
pub mod table;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;

pub use crate::builder::{Cache, CacheBuilder, Strategy};
pub use crate::ds::{ByteKey, RetentionQueue};
pub use crate::hash::{HashFunction, MetroHash64, Polynomial31};
pub use crate::map::{ChainingMap, LinearProbingMap, RetentionMap, RobinHoodMap};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::RetentionMetricsSnapshot;
pub use crate::table::Entry;
