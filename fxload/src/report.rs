//! Summary of a harness run.
use fxload_core::{ScenarioResult, SlaThresholds, SlaVerdict};
use serde::Serialize;
use std::fmt;

const RULE_WIDTH: usize = 200;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportRow {
    #[serde(flatten)]
    pub result: ScenarioResult,
    pub sla: SlaVerdict,
}

/// Scenario results in execution order, each with its SLA verdict.
///
/// `Display` renders the fixed-width table with its legend; [`Report::to_json`] gives the same
/// data for programmatic use.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    sla: SlaThresholds,
    rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(sla: SlaThresholds) -> Self {
        Self { sla, rows: vec![] }
    }

    pub fn push(&mut self, result: ScenarioResult, sla: SlaVerdict) {
        self.rows.push(ReportRow { result, sla });
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn all_passed(&self) -> bool {
        self.rows.iter().all(|row| row.sla.passed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|row| !row.sla.passed())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rows)
    }

    fn write_legend(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sla = self.sla_summary();
        let entries = [
            ("Scenario", "Name of the test scenario (Baseline, Load, Spike, Soak, Stress)".to_string()),
            ("Total Requests", "Total number of HTTP requests sent during the scenario".to_string()),
            ("Duration", "Total duration of the scenario in seconds".to_string()),
            ("RPS", "Requests per second (throughput)".to_string()),
            ("Avg Latency", "Average response time in milliseconds".to_string()),
            ("p90(ms)", percentile_legend("90")),
            ("p95(ms)", percentile_legend("95")),
            ("p99(ms)", percentile_legend("99")),
            ("p99.9(ms)", percentile_legend("99.9")),
            ("p99.99(ms)", percentile_legend("99.99")),
            ("Concurrency", "Number of concurrent workers used in the scenario".to_string()),
            ("Errors", "Number of failed requests (non-2xx status or no response)".to_string()),
            ("ErrRate", "Error rate as a percentage".to_string()),
            ("SLA", format!("PASS if {sla}; otherwise FAIL")),
        ];

        writeln!(f, "Legend:")?;
        for (column, description) in entries {
            writeln!(f, "  {column:<16}: {description}")?;
        }
        writeln!(f)?;
        writeln!(f, "Interpretation:")?;
        writeln!(f, "  - Lower latency and higher RPS indicate better performance.")?;
        writeln!(
            f,
            "  - p90 through p99.99 latencies expose outliers and worst-case response times."
        )?;
        writeln!(
            f,
            "  - Baseline sets a reference, Load models expected traffic, Spike a sudden surge, \
             Soak long-term stability and Stress the breaking point."
        )?;
        writeln!(f, "  - A scenario passes the SLA when {sla}.")
    }

    fn sla_summary(&self) -> String {
        format!(
            "error rate <= {}%, p95 latency <= {}ms, RPS >= {}",
            self.sla.max_error_rate * 100.,
            self.sla.max_p95_latency_ms,
            self.sla.min_throughput,
        )
    }
}

fn percentile_legend(p: &str) -> String {
    format!("{p}th percentile latency ({p}% of requests were at least this fast)")
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f)?;
        writeln!(f, "{heavy}")?;
        writeln!(f, "{:^RULE_WIDTH$}", "LOAD TEST RESULTS SUMMARY")?;
        writeln!(f, "{heavy}")?;
        writeln!(
            f,
            "{:<16} | {:<15} | {:<10} | {:<10} | {:<14} | {:<10} | {:<10} | {:<10} | {:<10} | {:<10} | {:<11} | {:<10} | {:<10} | {:<4}",
            "Scenario",
            "Total Requests",
            "Duration",
            "RPS",
            "Avg Latency",
            "p90(ms)",
            "p95(ms)",
            "p99(ms)",
            "p99.9(ms)",
            "p99.99(ms)",
            "Concurrency",
            "Errors",
            "ErrRate",
            "SLA",
        )?;
        writeln!(f, "{light}")?;
        for ReportRow { result: r, sla } in &self.rows {
            writeln!(
                f,
                "{:<16} | {:<15} | {:<10.2} | {:<10.2} | {:<14.2} | {:<10} | {:<10} | {:<10} | {:<10} | {:<10} | {:<11} | {:<10} | {:<10.2} | {:<4}",
                r.name,
                r.total_requests,
                r.duration.as_secs_f64(),
                r.throughput,
                r.avg_latency_ms,
                r.latency.p90,
                r.latency.p95,
                r.latency.p99,
                r.latency.p999,
                r.latency.p9999,
                r.concurrency,
                r.error_count,
                r.error_rate * 100.,
                sla,
            )?;
        }
        writeln!(f, "{heavy}")?;
        writeln!(f)?;
        self.write_legend(f)
    }
}
