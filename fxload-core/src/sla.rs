use crate::config::ConfigError;
use crate::constants::*;
use crate::stats::ScenarioResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pass/fail contract applied to every scenario.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlaThresholds {
    /// Fraction of failed requests tolerated, e.g. `0.01` for 1%.
    pub max_error_rate: f64,
    pub max_p95_latency_ms: u64,
    /// Requests per second.
    pub min_throughput: f64,
}

impl Default for SlaThresholds {
    fn default() -> Self {
        Self {
            max_error_rate: DEFAULT_SLA_MAX_ERROR_RATE,
            max_p95_latency_ms: DEFAULT_SLA_MAX_P95_LATENCY_MS,
            min_throughput: DEFAULT_SLA_MIN_THROUGHPUT,
        }
    }
}

impl SlaThresholds {
    pub fn new(max_error_rate: f64, max_p95_latency_ms: u64, min_throughput: f64) -> Self {
        Self {
            max_error_rate,
            max_p95_latency_ms,
            min_throughput,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.max_error_rate) {
            return Err(ConfigError::Invalid(format!(
                "sla.max_error_rate must be within [0, 1], found {}",
                self.max_error_rate
            )));
        }
        if !self.min_throughput.is_finite() || self.min_throughput < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sla.min_throughput must be a non-negative number, found {}",
                self.min_throughput
            )));
        }
        Ok(())
    }

    /// Every threshold `result` breaks. Empty means the scenario passed.
    pub fn violations(&self, result: &ScenarioResult) -> Vec<SlaViolation> {
        let mut violations = vec![];
        if result.error_rate > self.max_error_rate {
            violations.push(SlaViolation::ErrorRate {
                actual: result.error_rate,
                limit: self.max_error_rate,
            });
        }
        if result.latency.p95 > self.max_p95_latency_ms {
            violations.push(SlaViolation::P95Latency {
                actual: result.latency.p95,
                limit: self.max_p95_latency_ms,
            });
        }
        // NOTE: Written as a negated `>=` so a NaN throughput fails.
        if !(result.throughput >= self.min_throughput) {
            violations.push(SlaViolation::Throughput {
                actual: result.throughput,
                limit: self.min_throughput,
            });
        }
        violations
    }

    pub fn evaluate(&self, result: &ScenarioResult) -> SlaVerdict {
        if self.violations(result).is_empty() {
            SlaVerdict::Pass
        } else {
            SlaVerdict::Fail
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlaVerdict {
    Pass,
    Fail,
}

impl SlaVerdict {
    pub fn passed(self) -> bool {
        self == SlaVerdict::Pass
    }
}

impl fmt::Display for SlaVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlaVerdict::Pass => f.pad("PASS"),
            SlaVerdict::Fail => f.pad("FAIL"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SlaViolation {
    ErrorRate { actual: f64, limit: f64 },
    P95Latency { actual: u64, limit: u64 },
    Throughput { actual: f64, limit: f64 },
}

impl fmt::Display for SlaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlaViolation::ErrorRate { actual, limit } => write!(
                f,
                "error rate {:.2}% above {:.2}%",
                actual * 100.,
                limit * 100.
            ),
            SlaViolation::P95Latency { actual, limit } => {
                write!(f, "p95 latency {actual}ms above {limit}ms")
            }
            SlaViolation::Throughput { actual, limit } => {
                write!(f, "throughput {actual:.2} rps below {limit:.2} rps")
            }
        }
    }
}
