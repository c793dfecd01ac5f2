use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::RetentionMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for retention map snapshots.
///
/// Writes the Prometheus text exposition format so the output can be
/// scraped directly or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the underlying writer.
    pub fn into_writer(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_counter(&self, name: &str, value: u64) {
        let mut writer = self
            .writer
            .lock()
            .expect("metrics exporter writer poisoned");
        let _ = writeln!(writer, "# TYPE {} counter", name);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_gauge(&self, name: &str, value: u64) {
        let mut writer = self
            .writer
            .lock()
            .expect("metrics exporter writer poisoned");
        let _ = writeln!(writer, "# TYPE {} gauge", name);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send + Sync> MetricsExporter<RetentionMetricsSnapshot>
    for PrometheusTextExporter<W>
{
    fn export(&self, snapshot: &RetentionMetricsSnapshot) {
        self.write_counter(&self.metric_name("put_calls_total"), snapshot.put_calls);
        self.write_counter(&self.metric_name("put_new_total"), snapshot.put_new);
        self.write_counter(
            &self.metric_name("put_duplicate_total"),
            snapshot.put_duplicate,
        );
        self.write_counter(&self.metric_name("get_calls_total"), snapshot.get_calls);
        self.write_counter(&self.metric_name("get_hits_total"), snapshot.get_hits);
        self.write_counter(&self.metric_name("get_misses_total"), snapshot.get_misses);
        self.write_counter(
            &self.metric_name("deactivate_calls_total"),
            snapshot.deactivate_calls,
        );
        self.write_counter(
            &self.metric_name("deactivate_rejected_total"),
            snapshot.deactivate_rejected,
        );
        self.write_counter(&self.metric_name("evictions_total"), snapshot.evictions);
        self.write_counter(&self.metric_name("collisions_total"), snapshot.collisions);
        self.write_counter(&self.metric_name("resizes_total"), snapshot.resizes);
        self.write_gauge(&self.metric_name("len"), snapshot.len as u64);
        self.write_gauge(
            &self.metric_name("inactive_len"),
            snapshot.inactive_len as u64,
        );
        self.write_gauge(&self.metric_name("capacity"), snapshot.capacity as u64);
        self.write_gauge(
            &self.metric_name("retention_capacity"),
            snapshot.retention_capacity as u64,
        );
    }
}
