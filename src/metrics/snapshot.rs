/// Point-in-time copy of a retention map's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetentionMetricsSnapshot {
    pub put_calls: u64,
    pub put_new: u64,
    pub put_duplicate: u64,

    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub deactivate_calls: u64,
    pub deactivate_rejected: u64,
    pub evictions: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub inactive_len: usize,
    pub capacity: usize,
    pub retention_capacity: usize,
    pub collisions: u64,
    pub resizes: u64,
}

impl RetentionMetricsSnapshot {
    /// Fraction of `get` calls that found their key, or 0 with no calls.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
