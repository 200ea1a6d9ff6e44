//! What each worker sends and where.
use fxload_core::{Templates, ID_RANGE};
use rand::Rng;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Quotes,
    Trades,
}

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Quotes => "quotes",
            Endpoint::Trades => "trades",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute URLs of the two write endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    quotes: String,
    trades: String,
}

impl Target {
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            quotes: format!("{base}/quotes"),
            trades: format!("{base}/trades"),
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Quotes => &self.quotes,
            Endpoint::Trades => &self.trades,
        }
    }
}

/// Shared, read-only description of the traffic a worker generates.
#[derive(Clone, Debug)]
pub struct Workload {
    pub target: Target,
    pub templates: Templates,
}

impl Workload {
    pub fn new(target: Target, templates: Templates) -> Self {
        Self { target, templates }
    }

    /// A fresh `(quote_id, trade_id)` pair.
    pub(crate) fn next_ids(&self) -> (String, String) {
        let mut rng = rand::thread_rng();
        let quote_id = format!("Q{}", rng.gen_range(ID_RANGE));
        let trade_id = format!("T{}", rng.gen_range(ID_RANGE));
        (quote_id, trade_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_joins_paths() {
        let target = Target::new("http://localhost:8080/api/");
        assert_eq!(target.url(Endpoint::Quotes), "http://localhost:8080/api/quotes");
        assert_eq!(target.url(Endpoint::Trades), "http://localhost:8080/api/trades");
    }

    #[test]
    fn ids_have_prefix_and_range() {
        let workload = Workload::new(Target::new("http://x"), Templates::default());
        for _ in 0..1_000 {
            let (quote_id, trade_id) = workload.next_ids();
            let q: u32 = quote_id.strip_prefix('Q').unwrap().parse().unwrap();
            let t: u32 = trade_id.strip_prefix('T').unwrap().parse().unwrap();
            assert!(ID_RANGE.contains(&q));
            assert!(ID_RANGE.contains(&t));
        }
    }
}
