use clap::{Parser, ValueEnum};
use mock_service::{FailMode, MockConfig};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Local quote/trade API for trying out fxload.
#[derive(Debug, Parser)]
struct Args {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Delay added to every response, in milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    #[arg(long, value_enum)]
    fail: Option<Fail>,

    /// Requests per second above which the service answers 503.
    #[arg(long)]
    max_tps: Option<NonZeroU32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Fail {
    Quotes,
    Trades,
    Both,
}

impl From<Fail> for FailMode {
    fn from(fail: Fail) -> Self {
        match fail {
            Fail::Quotes => FailMode::Quotes,
            Fail::Trades => FailMode::Trades,
            Fail::Both => FailMode::Both,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=info,tower_http=info")),
        )
        .init();

    let config = MockConfig {
        delay: Duration::from_millis(args.delay_ms),
        fail: args.fail.map(Into::into),
        max_tps: args.max_tps,
    };

    let listener = TcpListener::bind(args.addr).await?;
    tracing::info!("Listening on http://{}{}", listener.local_addr()?, mock_service::API_PREFIX);
    mock_service::run(listener, config).await?;
    Ok(())
}
