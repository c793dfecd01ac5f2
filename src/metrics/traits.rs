//! # Metrics Traits
//!
//! Recording, snapshotting and export are split into small traits so the
//! map only ever writes counters, tests and benches read snapshots, and
//! production code publishes them.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────┐   ┌──────────────────────────────┐
//!   │  RetentionMetricsRecorder    │   │ RetentionMetricsReadRecorder │
//!   │  put_new / put_duplicate     │   │  get_hit / get_miss          │
//!   │  deactivate / rejected       │   │  (&self, interior mutability)│
//!   │  eviction                    │   └──────────────────────────────┘
//!   └──────────────────────────────┘
//!
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters recorded from mutating map operations.
pub trait RetentionMetricsRecorder {
    fn record_put_new(&mut self);
    fn record_put_duplicate(&mut self);
    fn record_deactivate(&mut self);
    fn record_deactivate_rejected(&mut self);
    fn record_eviction(&mut self);
}

/// Counters recorded from `&self` lookups.
pub trait RetentionMetricsReadRecorder {
    fn record_get_hit(&self);
    fn record_get_miss(&self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
