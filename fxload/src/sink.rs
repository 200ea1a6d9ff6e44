//! Shared measurement state for one scenario run.
use crate::driver::Exchange;
use crate::workload::Endpoint;
use metrics_util::AtomicBucket;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Append-only collection of latency samples in milliseconds.
///
/// Cloning shares the underlying bucket; appends from any number of tasks never block each other.
#[derive(Clone)]
pub struct LatencySink {
    samples: Arc<AtomicBucket<u64>>,
}

impl Default for LatencySink {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencySink {
    pub fn new() -> Self {
        Self {
            samples: Arc::new(AtomicBucket::new()),
        }
    }

    pub fn record(&self, millis: u64) {
        self.samples.push(millis);
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Removes and returns every sample recorded so far, in no particular order.
    pub fn drain(&self) -> Vec<u64> {
        let mut samples = vec![];
        self.samples.clear_with(|block| samples.extend_from_slice(block));
        samples
    }
}

/// Count of failed requests, incremented concurrently by workers.
#[derive(Clone, Debug, Default)]
pub struct ErrorCounter {
    count: Arc<AtomicU64>,
}

impl ErrorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Handle each worker uses to report request outcomes.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    latencies: LatencySink,
    errors: ErrorCounter,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, endpoint: Endpoint, exchange: Exchange) {
        let millis = exchange.elapsed_ms();
        self.latencies.record(millis);

        #[cfg(feature = "metrics")]
        metrics::histogram!("fxload_request_latency_ms", "endpoint" => endpoint.as_str())
            .record(millis as f64);

        if exchange.is_success() {
            #[cfg(feature = "metrics")]
            metrics::counter!("fxload_request_success", "endpoint" => endpoint.as_str())
                .increment(1);
        } else {
            self.record_error(endpoint);
        }
    }

    /// A failed request with no usable latency.
    pub fn record_error(&self, endpoint: Endpoint) {
        self.errors.increment();

        #[cfg(feature = "metrics")]
        metrics::counter!("fxload_request_error", "endpoint" => endpoint.as_str()).increment(1);
        #[cfg(not(feature = "metrics"))]
        let _ = endpoint;
    }

    pub fn latencies(&self) -> &LatencySink {
        &self.latencies
    }

    pub fn errors(&self) -> &ErrorCounter {
        &self.errors
    }
}
