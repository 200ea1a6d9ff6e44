use crate::driver::RequestDriver;
use crate::sink::Recorder;
use crate::workload::{Endpoint, Workload};
use fxload_core::REQUESTS_PER_ITERATION;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// When a worker stops.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Until {
    Iterations(NonZeroU32),
    /// Checked before every iteration, so a worker may overrun by one iteration.
    Deadline(Instant),
}

/// One concurrent sender of correlated quote/trade pairs.
pub(crate) struct Worker<D> {
    id: usize,
    driver: D,
    workload: Arc<Workload>,
    recorder: Recorder,
}

impl<D: RequestDriver> Worker<D> {
    pub fn new(id: usize, driver: D, workload: Arc<Workload>, recorder: Recorder) -> Self {
        Self {
            id,
            driver,
            workload,
            recorder,
        }
    }

    /// Runs to completion and returns the number of requests this worker attempted.
    pub async fn run(self, until: Until) -> u64 {
        let mut completed = 0;
        match until {
            Until::Iterations(iterations) => {
                for _ in 0..iterations.get() {
                    self.iteration().await;
                    completed += REQUESTS_PER_ITERATION;
                }
            }
            Until::Deadline(deadline) => {
                while Instant::now() < deadline {
                    self.iteration().await;
                    completed += REQUESTS_PER_ITERATION;
                }
            }
        }
        trace!("Worker {} finished after {completed} requests", self.id);
        completed
    }

    async fn iteration(&self) {
        let (quote_id, trade_id) = self.workload.next_ids();

        let quote = self.workload.templates.quote(&quote_id);
        self.send(Endpoint::Quotes, quote).await;

        let trade = self.workload.templates.trade(&trade_id, &quote_id);
        self.send(Endpoint::Trades, trade).await;
    }

    async fn send(&self, endpoint: Endpoint, body: String) {
        let url = self.workload.target.url(endpoint);
        match self.driver.post(url, body).await {
            Ok(exchange) => self.recorder.record(endpoint, exchange),
            Err(err) => {
                warn!("Worker {} failed to send to {endpoint}: {err}", self.id);
                self.recorder.record_error(endpoint);
            }
        }
    }
}
