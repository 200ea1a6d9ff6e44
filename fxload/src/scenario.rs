//! Runs one scenario: spawns its workers, waits for them, reduces what they measured.
use crate::driver::{DriverError, RequestDriver};
use crate::error::HarnessError;
use crate::sink::Recorder;
use crate::worker::{Until, Worker};
use crate::workload::Workload;
use fxload_core::{RunMode, ScenarioConfig, ScenarioResult, SortedSamples, REQUESTS_PER_ITERATION};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{timeout_at, Instant};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Runs `config.concurrency` workers against `workload` and builds the scenario's result.
///
/// Every worker gets its own driver from `make_driver`. If the workers have not all finished
/// within `join_timeout` of launch, the stragglers are aborted and the run is a hard failure.
#[instrument(name = "scenario", skip_all, fields(name = %config.name))]
pub async fn run_scenario<D, M>(
    config: &ScenarioConfig,
    workload: Arc<Workload>,
    make_driver: M,
    join_timeout: Duration,
) -> Result<ScenarioResult, HarnessError>
where
    D: RequestDriver,
    M: Fn() -> Result<D, DriverError>,
{
    info!("Running {} with config {:?}", config.name, config);

    let concurrency = config.concurrency.get();
    let drivers = (0..concurrency)
        .map(|_| make_driver())
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(feature = "metrics")]
    metrics::gauge!("fxload_concurrency", "scenario" => config.name.clone())
        .set(concurrency as f64);

    let recorder = Recorder::new();
    let start = Instant::now();
    let until = match config.mode() {
        RunMode::Iterations(iterations) => Until::Iterations(iterations),
        RunMode::Duration(duration) => Until::Deadline(start + duration),
    };

    let mut tasks: Vec<JoinHandle<u64>> = drivers
        .into_iter()
        .enumerate()
        .map(|(id, driver)| {
            let worker = Worker::new(id, driver, workload.clone(), recorder.clone());
            tokio::spawn(worker.run(until).in_current_span())
        })
        .collect();

    let joined = join_all(&mut tasks, start + join_timeout).await;
    if joined.is_err() {
        for task in &tasks {
            task.abort();
        }
    }
    let completed = joined.map_err(|failure| match failure {
        JoinFailure::TimedOut => {
            error!("Workers did not finish within {join_timeout:?}");
            HarnessError::JoinTimeout {
                scenario: config.name.clone(),
                timeout: join_timeout,
            }
        }
        JoinFailure::Failed(source) => {
            error!("Worker failed: {source}");
            HarnessError::WorkerPanicked {
                scenario: config.name.clone(),
                source,
            }
        }
    })?;
    let elapsed = start.elapsed();

    let total_requests = match config.mode() {
        RunMode::Iterations(iterations) => {
            concurrency as u64 * iterations.get() as u64 * REQUESTS_PER_ITERATION
        }
        RunMode::Duration(_) => completed,
    };
    debug_assert_eq!(total_requests, completed);

    let samples = SortedSamples::new(recorder.latencies().drain());
    let result = ScenarioResult::new(
        &config.name,
        concurrency,
        total_requests,
        recorder.errors().get(),
        elapsed,
        &samples,
    );

    info!(
        "Scenario complete in {}: {} requests, {:.2} rps, p95={}ms, errors={}",
        humantime::format_duration(round_to_millis(elapsed)),
        result.total_requests,
        result.throughput,
        result.latency.p95,
        result.error_count,
    );

    Ok(result)
}

enum JoinFailure {
    TimedOut,
    Failed(JoinError),
}

/// Sums the per-worker request counts, giving up at `deadline`.
async fn join_all(tasks: &mut [JoinHandle<u64>], deadline: Instant) -> Result<u64, JoinFailure> {
    let mut completed = 0;
    for task in tasks.iter_mut() {
        match timeout_at(deadline, task).await {
            Ok(Ok(count)) => completed += count,
            Ok(Err(err)) => return Err(JoinFailure::Failed(err)),
            Err(_) => return Err(JoinFailure::TimedOut),
        }
    }
    Ok(completed)
}

fn round_to_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis() as u64)
}
