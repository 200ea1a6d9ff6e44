//! The full test run: every selected scenario, one after another.
use crate::driver::{DriverError, HttpDriver, RequestDriver};
use crate::error::HarnessError;
use crate::report::Report;
use crate::scenario::run_scenario;
use crate::workload::{Target, Workload};
use fxload_core::{HarnessConfig, ScenarioKind, SlaVerdict};
use std::sync::Arc;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Runs scenarios strictly in sequence so one scenario's load never overlaps the next.
///
/// # Example
///
/// ```no_run
/// use fxload::Harness;
/// use fxload_core::{HarnessConfig, ScenarioKind};
///
/// #[tokio::main]
/// async fn main() {
///     let harness = Harness::new(HarnessConfig::default())
///         .unwrap()
///         .only(&[ScenarioKind::Baseline, ScenarioKind::Load]);
///     let outcome = harness.run().await;
///     println!("{}", outcome.report);
/// }
/// ```
pub struct Harness {
    config: HarnessConfig,
    workload: Arc<Workload>,
    selection: Vec<ScenarioKind>,
}

/// Results of every scenario that completed, plus the error that stopped the run early, if any.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub error: Option<HarnessError>,
}

impl RunOutcome {
    pub fn into_result(self) -> Result<Report, HarnessError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.report),
        }
    }
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        let templates = config.templates()?;
        let workload = Workload::new(Target::new(&config.base_url), templates);

        Ok(Self {
            config,
            workload: Arc::new(workload),
            selection: ScenarioKind::ALL.to_vec(),
        })
    }

    /// Restricts the run to `kinds`. Order is always Baseline, Load, Spike, Soak, Stress.
    /// An empty slice keeps every scenario.
    pub fn only(mut self, kinds: &[ScenarioKind]) -> Self {
        if !kinds.is_empty() {
            self.selection = ScenarioKind::ALL
                .into_iter()
                .filter(|kind| kinds.contains(kind))
                .collect();
        }
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn selection(&self) -> &[ScenarioKind] {
        &self.selection
    }

    /// Runs against the configured target over HTTP.
    pub async fn run(&self) -> RunOutcome {
        let request_timeout = self.config.timeouts.request;
        self.run_with(|| HttpDriver::new(request_timeout)).await
    }

    /// Runs with drivers from `make_driver`, one per worker.
    #[instrument(name = "harness", skip_all, fields(base_url = %self.config.base_url))]
    pub async fn run_with<D, M>(&self, make_driver: M) -> RunOutcome
    where
        D: RequestDriver,
        M: Fn() -> Result<D, DriverError>,
    {
        let sla = self.config.sla;
        let mut report = Report::new(sla);

        for kind in &self.selection {
            let scenario = self.config.scenario(*kind);
            let join_timeout = self.config.timeouts.join_timeout(&scenario);

            match run_scenario(&scenario, self.workload.clone(), &make_driver, join_timeout).await
            {
                Ok(result) => {
                    let violations = sla.violations(&result);
                    let verdict = if violations.is_empty() {
                        info!("{} passed the SLA", result.name);
                        SlaVerdict::Pass
                    } else {
                        for violation in &violations {
                            warn!("{} failed the SLA: {violation}", result.name);
                        }
                        SlaVerdict::Fail
                    };
                    report.push(result, verdict);
                }
                Err(err) => {
                    error!("Aborting remaining scenarios: {err}");
                    return RunOutcome {
                        report,
                        error: Some(err),
                    };
                }
            }
        }

        RunOutcome {
            report,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::stub::{Behavior, StubDriver};
    use fxload_core::ScenarioSettings;
    use std::num::{NonZeroU32, NonZeroUsize};
    use std::time::Duration;

    fn small_config() -> HarnessConfig {
        let settings = |concurrency, iterations| ScenarioSettings {
            concurrency: NonZeroUsize::new(concurrency).unwrap(),
            iterations_per_worker: NonZeroU32::new(iterations).unwrap(),
            duration: None,
        };

        let mut config = HarnessConfig::default();
        config.base_url = "http://fx.test/api".to_string();
        config.scenarios.baseline = settings(2, 5);
        config.scenarios.load = settings(4, 5);
        config.scenarios.spike = settings(8, 2);
        config.scenarios.soak = ScenarioSettings {
            duration: Some(Duration::from_secs(1)),
            ..settings(2, 1)
        };
        config.scenarios.stress = settings(16, 2);
        config
    }

    #[tracing_test::traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn runs_every_scenario_in_order() {
        let harness = Harness::new(small_config()).unwrap();
        let outcome = harness
            .run_with(|| Ok(StubDriver::new(Duration::from_millis(1), Behavior::Status(201))))
            .await;

        assert!(outcome.error.is_none());
        let names: Vec<_> = outcome
            .report
            .rows()
            .iter()
            .map(|row| row.result.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Baseline Test", "Load Test", "Spike Test", "Soak Test", "Stress Test"]
        );

        let totals: Vec<_> = outcome
            .report
            .rows()
            .iter()
            .map(|row| row.result.total_requests)
            .collect();
        assert_eq!(totals[0], 20);
        assert_eq!(totals[1], 40);
        assert_eq!(totals[2], 32);
        assert!(totals[3] > 0);
        assert_eq!(totals[4], 64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn subset_keeps_canonical_order() {
        let harness = Harness::new(small_config())
            .unwrap()
            .only(&[ScenarioKind::Stress, ScenarioKind::Baseline]);
        assert_eq!(
            harness.selection(),
            &[ScenarioKind::Baseline, ScenarioKind::Stress]
        );

        let report = harness
            .run_with(|| Ok(StubDriver::ok()))
            .await
            .into_result()
            .unwrap();
        assert_eq!(report.rows().len(), 2);
        assert_eq!(report.rows()[1].result.name, "Stress Test");
    }

    #[tracing_test::traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sla_failures_are_still_reported() {
        let harness = Harness::new(small_config())
            .unwrap()
            .only(&[ScenarioKind::Baseline, ScenarioKind::Load]);
        let report = harness
            .run_with(|| Ok(StubDriver::new(Duration::ZERO, Behavior::Status(503))))
            .await
            .into_result()
            .unwrap();

        assert_eq!(report.rows().len(), 2);
        for row in report.rows() {
            assert_eq!(row.result.error_rate, 1.0);
            assert_eq!(row.sla, SlaVerdict::Fail);
            assert_eq!(
                row.sla,
                harness.config().sla.evaluate(&row.result),
                "{}",
                row.result.name
            );
        }
        assert!(logs_contain("Load Test failed the SLA: error rate"));
        assert!(!logs_contain("passed the SLA"));
    }

    #[tokio::test(start_paused = true)]
    async fn join_timeout_stops_the_run() {
        let mut config = small_config();
        config.timeouts.join = Duration::from_secs(5);
        let harness = Harness::new(config).unwrap();

        let outcome = harness
            .run_with(|| Ok(StubDriver::new(Duration::ZERO, Behavior::Hang)))
            .await;

        assert!(outcome.report.is_empty());
        assert!(matches!(
            outcome.error,
            Some(HarnessError::JoinTimeout { ref scenario, .. }) if scenario == "Baseline Test"
        ));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = small_config();
        config.sla.max_error_rate = 2.;
        assert!(matches!(
            Harness::new(config),
            Err(HarnessError::Config(_))
        ));
    }
}
