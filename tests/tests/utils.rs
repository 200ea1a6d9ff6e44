use fxload_core::HarnessConfig;
use mock_service::{MockConfig, API_PREFIX};
use std::sync::OnceLock;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter("fxload=debug,mock_service=debug,axum::rejection=trace")
            .with_test_writer()
            .try_init();
    });
}

/// Starts a mock service on an ephemeral port and returns its API base URL.
#[allow(unused)]
pub async fn mock(config: MockConfig) -> String {
    let addr = mock_service::spawn(config).await.unwrap();
    format!("http://{addr}{API_PREFIX}")
}

/// Small scenarios so a full run takes a couple of seconds.
#[allow(unused)]
pub fn small_config(base_url: &str) -> HarnessConfig {
    HarnessConfig::from_toml(&format!(
        r#"
        base_url = "{base_url}"

        [scenarios.baseline]
        concurrency = 2
        iterations_per_worker = 5

        [scenarios.load]
        concurrency = 4
        iterations_per_worker = 10

        [scenarios.spike]
        concurrency = 10
        iterations_per_worker = 2

        [scenarios.soak]
        concurrency = 2
        iterations_per_worker = 1
        duration_seconds = 1

        [scenarios.stress]
        concurrency = 20
        iterations_per_worker = 2

        [sla]
        max_error_rate = 0.01
        max_p95_latency_ms = 1000
        min_throughput = 1.0
        "#
    ))
    .unwrap()
}
