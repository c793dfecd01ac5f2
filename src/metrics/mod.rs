//! Optional operation metrics (feature `metrics`).
//!
//! ## Example Usage
//!
//! ```
//! use retirekit::map::ChainingMap;
//! use retirekit::metrics::{MetricsExporter, MetricsSnapshotProvider, PrometheusTextExporter};
//!
//! let mut map: ChainingMap<u32> = ChainingMap::new(16, 2);
//! map.put_if_empty("A-0", 1);
//! map.get("A-0");
//! map.get("missing");
//!
//! let snapshot = map.snapshot();
//! assert_eq!(snapshot.get_hits, 1);
//! assert_eq!(snapshot.get_misses, 1);
//!
//! let exporter = PrometheusTextExporter::new("cache", Vec::new());
//! exporter.export(&snapshot);
//! ```

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::RetentionMetrics;
pub use snapshot::RetentionMetricsSnapshot;
pub use traits::{
    MetricsExporter, MetricsReset, MetricsSnapshotProvider, RetentionMetricsReadRecorder,
    RetentionMetricsRecorder,
};
