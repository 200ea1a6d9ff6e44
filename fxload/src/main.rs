use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use fxload::Harness;
use fxload_core::{HarnessConfig, ScenarioKind};
#[cfg(feature = "metrics")]
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Runs the Baseline, Load, Spike, Soak and Stress scenarios against the quote/trade API.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file. Falls back to $FXLOAD_CONFIG, then ./fxload.toml if present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `base_url` from the configuration.
    #[arg(short, long)]
    base_url: Option<String>,

    /// Runs only the named scenarios. May be repeated.
    #[arg(long, value_enum)]
    only: Vec<Scenario>,

    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Exits non-zero when any scenario fails its SLA.
    #[arg(long)]
    enforce_sla: bool,

    /// Serves Prometheus metrics on this address while the run is in progress.
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    Baseline,
    Load,
    Spike,
    Soak,
    Stress,
}

impl From<Scenario> for ScenarioKind {
    fn from(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Baseline => ScenarioKind::Baseline,
            Scenario::Load => ScenarioKind::Load,
            Scenario::Spike => ScenarioKind::Spike,
            Scenario::Soak => ScenarioKind::Soak,
            Scenario::Stress => ScenarioKind::Stress,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fxload=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    #[cfg(feature = "metrics")]
    if let Some(addr) = cli.metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("installing Prometheus exporter")?;
        info!("Serving metrics on {addr}");
    }
    #[cfg(not(feature = "metrics"))]
    if cli.metrics_addr.is_some() {
        tracing::warn!("Built without the metrics feature, ignoring --metrics-addr");
    }

    let mut config = HarnessConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let only: Vec<ScenarioKind> = cli.only.into_iter().map(Into::into).collect();
    let harness = Harness::new(config)?.only(&only);
    info!(
        "Starting run against {} ({} scenarios)",
        harness.config().base_url,
        harness.selection().len()
    );

    let outcome = harness.run().await;

    match cli.format {
        Format::Table => print!("{}", outcome.report),
        Format::Json => println!("{}", outcome.report.to_json()?),
    }

    if let Some(err) = outcome.error {
        error!("Run aborted: {err}");
        return Err(err.into());
    }

    if cli.enforce_sla && !outcome.report.all_passed() {
        let failed: Vec<_> = outcome
            .report
            .failed()
            .map(|row| row.result.name.as_str())
            .collect();
        bail!("SLA not met by: {}", failed.join(", "));
    }

    Ok(())
}
