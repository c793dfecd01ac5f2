use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{RetentionMetricsReadRecorder, RetentionMetricsRecorder};

/// Operation counters owned by a retention map.
#[derive(Debug, Default)]
pub struct RetentionMetrics {
    pub put_calls: u64,
    pub put_new: u64,
    pub put_duplicate: u64,
    pub get_calls: MetricsCell,
    pub get_hits: MetricsCell,
    pub get_misses: MetricsCell,
    pub deactivate_calls: u64,
    pub deactivate_rejected: u64,
    pub evictions: u64,
}

impl RetentionMetricsRecorder for RetentionMetrics {
    fn record_put_new(&mut self) {
        self.put_calls += 1;
        self.put_new += 1;
    }

    fn record_put_duplicate(&mut self) {
        self.put_calls += 1;
        self.put_duplicate += 1;
    }

    fn record_deactivate(&mut self) {
        self.deactivate_calls += 1;
    }

    fn record_deactivate_rejected(&mut self) {
        self.deactivate_calls += 1;
        self.deactivate_rejected += 1;
    }

    fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

impl RetentionMetricsReadRecorder for RetentionMetrics {
    fn record_get_hit(&self) {
        self.get_calls.incr();
        self.get_hits.incr();
    }

    fn record_get_miss(&self) {
        self.get_calls.incr();
        self.get_misses.incr();
    }
}
