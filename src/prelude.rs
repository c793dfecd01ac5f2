pub use crate::builder::{Cache, CacheBuilder, Strategy};
pub use crate::ds::ByteKey;
pub use crate::error::{ConfigError, ContractViolation, InvariantError};
pub use crate::hash::{HashFunction, MetroHash64, Polynomial31, fold_to_index};
pub use crate::map::{ChainingMap, LinearProbingMap, RetentionMap, RobinHoodMap};
pub use crate::table::Entry;
pub use crate::traits::RetentionCache;

#[cfg(feature = "metrics")]
pub use crate::metrics::{
    MetricsExporter, MetricsSnapshotProvider, PrometheusTextExporter, RetentionMetricsSnapshot,
};
