use crate::percentile::SortedSamples;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSecondsWithFrac};
use std::time::Duration;

/// Tail latencies of a scenario, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyPercentiles {
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
    pub p999: u64,
    pub p9999: u64,
}

impl LatencyPercentiles {
    pub fn from_samples(samples: &SortedSamples) -> Self {
        Self {
            p90: samples.percentile(0.90),
            p95: samples.percentile(0.95),
            p99: samples.percentile(0.99),
            p999: samples.percentile(0.999),
            p9999: samples.percentile(0.9999),
        }
    }
}

/// Metrics for one completed scenario. Never mutated after creation.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    /// Attempted requests, quotes and trades together.
    pub total_requests: u64,
    /// Measured wall-clock span of the scenario.
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    #[serde(rename = "duration_seconds")]
    pub duration: Duration,
    /// Requests per second.
    pub throughput: f64,
    pub avg_latency_ms: f64,
    pub latency: LatencyPercentiles,
    pub concurrency: usize,
    pub error_count: u64,
    pub error_rate: f64,
}

impl ScenarioResult {
    /// Reduces the raw counters of a scenario run into its result.
    pub fn new(
        name: &str,
        concurrency: usize,
        total_requests: u64,
        error_count: u64,
        duration: Duration,
        samples: &SortedSamples,
    ) -> Self {
        let secs = duration.as_secs_f64();
        let throughput = if secs > 0. {
            total_requests as f64 / secs
        } else {
            0.
        };
        let error_rate = if total_requests == 0 {
            0.
        } else {
            error_count as f64 / total_requests as f64
        };

        Self {
            name: name.to_string(),
            total_requests,
            duration,
            throughput,
            avg_latency_ms: samples.mean(),
            latency: LatencyPercentiles::from_samples(samples),
            concurrency,
            error_count,
            error_rate,
        }
    }
}
