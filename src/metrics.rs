//! Observability for remote fetches.
//!
//! With the `metrics` feature, [`METRICS`] records one counter increment and
//! one duration sample per fetch. With the `tracing` feature,
//! [`tracing_helpers`] provides the spans wrapped around each fetch.

#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;
#[cfg(feature = "metrics")]
use opentelemetry::{
    global,
    metrics::{Counter, Histogram},
    KeyValue as Attribute,
};

#[cfg(feature = "metrics")]
pub static METRICS: Lazy<RemoteMetrics> = Lazy::new(RemoteMetrics::init);

#[cfg(feature = "metrics")]
pub struct RemoteMetrics {
    pub fetches_total: Counter<u64>,
    pub fetch_errors_total: Counter<u64>,
    pub fetch_keys: Histogram<u64>,
    pub fetch_duration: Histogram<f64>,
}

#[cfg(feature = "metrics")]
impl RemoteMetrics {
    pub fn init() -> Self {
        let meter = global::meter("lifeguard_remote");

        let fetches_total = meter
            .u64_counter("lifeguard_remote_fetches_total")
            .with_description("Total remote relation fetches")
            .build();

        let fetch_errors_total = meter
            .u64_counter("lifeguard_remote_fetch_errors_total")
            .with_description("Remote relation fetches that returned an error")
            .build();

        let fetch_keys = meter
            .u64_histogram("lifeguard_remote_fetch_keys")
            .with_description("Distinct keys sent per remote fetch")
            .build();

        let fetch_duration = meter
            .f64_histogram("lifeguard_remote_fetch_duration_seconds")
            .with_description("Duration of remote fetches")
            .build();

        Self {
            fetches_total,
            fetch_errors_total,
            fetch_keys,
            fetch_duration,
        }
    }

    pub fn record_fetch(&self, relation: &str, keys: usize, elapsed: std::time::Duration) {
        let attrs = [Attribute::new("relation", relation.to_string())];
        self.fetches_total.add(1, &attrs);
        self.fetch_keys.record(keys as u64, &attrs);
        self.fetch_duration.record(elapsed.as_secs_f64(), &attrs);
    }

    pub fn record_fetch_error(&self, relation: &str) {
        self.fetch_errors_total
            .add(1, &[Attribute::new("relation", relation.to_string())]);
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    /// Span around one batched fetch
    pub fn remote_fetch_span(relation: &str, keys: usize) -> Span {
        tracing::info_span!("lifeguard_remote.fetch", relation = %relation, keys = keys)
    }

    /// Span around one lazy resolution
    pub fn lazy_resolve_span(relation: &str) -> Span {
        tracing::debug_span!("lifeguard_remote.resolve", relation = %relation)
    }
}
