use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Environment variable consulted when no `--config` path is given.
pub const CONFIG_ENV_VAR: &str = "FXLOAD_CONFIG";
pub const DEFAULT_CONFIG_NAME: &str = "fxload.toml";

pub const QUOTE_ID_PLACEHOLDER: &str = "${quoteId}";
pub const TRADE_ID_PLACEHOLDER: &str = "${tradeId}";

/// Status recorded when a request never produced an HTTP response.
pub const TRANSPORT_FAILURE: u16 = 0;

/// Each loop body sends one quote and one trade.
pub const REQUESTS_PER_ITERATION: u64 = 2;

pub const DEFAULT_SLA_MAX_ERROR_RATE: f64 = 0.01;
pub const DEFAULT_SLA_MAX_P95_LATENCY_MS: u64 = 250;
pub const DEFAULT_SLA_MIN_THROUGHPUT: f64 = 50.0;

pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_SOAK_GRACE: Duration = Duration::from_secs(60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const fn nz_usize(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("zero concurrency constant"),
    }
}

pub(crate) const fn nz_u32(n: u32) -> NonZeroU32 {
    match NonZeroU32::new(n) {
        Some(n) => n,
        None => panic!("zero iteration constant"),
    }
}

/// Generated identifiers are a one-letter prefix followed by a number in this range.
pub const ID_RANGE: std::ops::RangeInclusive<u32> = 100_000..=999_999;
