mod utils;
#[allow(unused)]
use utils::*;

use fxload::{Harness, HarnessError};
use fxload_core::{ScenarioKind, SlaVerdict};
use mock_service::{FailMode, MockConfig};
use std::net::TcpListener;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn clean_run_against_mock() {
    init();
    let base_url = mock(MockConfig::default()).await;
    let harness = Harness::new(small_config(&base_url)).unwrap();

    let report = harness.run().await.into_result().unwrap();

    let rows = report.rows();
    assert_eq!(rows.len(), 5);
    let totals: Vec<_> = rows.iter().map(|row| row.result.total_requests).collect();
    assert_eq!(totals[0], 20);
    assert_eq!(totals[1], 80);
    assert_eq!(totals[2], 40);
    assert!(totals[3] >= 4);
    assert_eq!(totals[4], 80);

    // Every trade references a quote the same worker just created, so none are rejected.
    for row in rows {
        assert_eq!(row.result.error_count, 0, "{}", row.result.name);
        assert_eq!(row.sla, SlaVerdict::Pass, "{}", row.result.name);
    }
    assert!(report.all_passed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_trades_halve_the_error_rate() {
    init();
    let base_url = mock(MockConfig {
        fail: Some(FailMode::Trades),
        ..Default::default()
    })
    .await;
    let harness = Harness::new(small_config(&base_url))
        .unwrap()
        .only(&[ScenarioKind::Load]);

    let report = harness.run().await.into_result().unwrap();

    let row = &report.rows()[0];
    assert_eq!(row.result.total_requests, 80);
    assert_eq!(row.result.error_count, 40);
    assert_eq!(row.result.error_rate, 0.5);
    assert_eq!(row.sla, SlaVerdict::Fail);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unreachable_target_fails_every_request() {
    init();
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let harness = Harness::new(small_config(&format!("http://127.0.0.1:{port}/api")))
        .unwrap()
        .only(&[ScenarioKind::Baseline]);

    let report = harness.run().await.into_result().unwrap();

    let row = &report.rows()[0];
    assert_eq!(row.result.total_requests, 20);
    assert_eq!(row.result.error_count, 20);
    assert_eq!(row.result.error_rate, 1.0);
    assert_eq!(row.sla, SlaVerdict::Fail);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn latency_reflects_service_delay() {
    init();
    let base_url = mock(MockConfig {
        delay: Duration::from_millis(20),
        ..Default::default()
    })
    .await;
    let harness = Harness::new(small_config(&base_url))
        .unwrap()
        .only(&[ScenarioKind::Baseline]);

    let report = harness.run().await.into_result().unwrap();

    let result = &report.rows()[0].result;
    assert!(result.latency.p90 >= 20);
    assert!(result.avg_latency_ms >= 20.);
    // Two workers, ten sequential 20ms requests each.
    assert!(result.duration >= Duration::from_millis(200));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn soak_runs_for_its_duration() {
    init();
    let base_url = mock(MockConfig {
        delay: Duration::from_millis(5),
        ..Default::default()
    })
    .await;
    let harness = Harness::new(small_config(&base_url))
        .unwrap()
        .only(&[ScenarioKind::Soak]);

    let report = harness.run().await.into_result().unwrap();

    let result = &report.rows()[0].result;
    assert_eq!(result.name, "Soak Test");
    assert!(result.duration >= Duration::from_secs(1));
    assert!(result.duration < Duration::from_secs(3));
    assert!(result.total_requests > 4);
    assert_eq!(result.total_requests % 2, 0);
    assert_eq!(result.error_count, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn json_report_matches_table() {
    init();
    let base_url = mock(MockConfig::default()).await;
    let harness = Harness::new(small_config(&base_url))
        .unwrap()
        .only(&[ScenarioKind::Baseline, ScenarioKind::Spike]);

    let report = harness.run().await.into_result().unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Baseline Test", "Spike Test"]);

    let table = report.to_string();
    assert!(table.contains("LOAD TEST RESULTS SUMMARY"));
    assert!(table.contains("Spike Test"));
}

#[test]
fn bad_base_url_is_a_config_error() {
    let mut config = small_config("http://localhost:8080/api");
    config.base_url = "ftp://localhost/api".to_string();
    assert!(matches!(Harness::new(config), Err(HarnessError::Config(_))));
}
