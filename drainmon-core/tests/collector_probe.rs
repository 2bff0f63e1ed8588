//! Collector tests against a stub metrics endpoint
//!
//! The collector monitors the test process itself, so OS-level fields are
//! always real; the endpoint side is served by wiremock.

use drainmon_config::HttpConfig;
use drainmon_core::{Collector, Phase};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn metrics_body(pending: u64) -> serde_json::Value {
    json!({
        "thread_pool": {
            "total_tokens": 40,
            "borrowed_tokens": 11,
            "available_tokens": 29,
            "tasks_waiting": 2
        },
        "background_tasks": { "pending_count": pending },
        "threading": { "active_thread_count": 47 }
    })
}

async fn stub_server(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn attach_to_self(metrics_url: String) -> Collector {
    Collector::attach(std::process::id(), metrics_url, &HttpConfig::default()).unwrap()
}

#[tokio::test]
async fn test_healthy_endpoint_populates_whole_snapshot() {
    let server = stub_server(ResponseTemplate::new(200).set_body_json(metrics_body(6))).await;
    let mut collector = attach_to_self(format!("{}/metrics", server.uri()));

    let sample = collector.collect(Phase::Test).await.unwrap();

    assert_eq!(sample.phase, Phase::Test);
    assert!(sample.memory_rss_bytes > 0);
    assert!(sample.memory_vms_bytes > 0);

    let runtime = sample.runtime.expect("endpoint healthy, snapshot expected");
    assert_eq!(runtime.thread_pool_total, 40);
    assert_eq!(runtime.thread_pool_borrowed, 11);
    assert_eq!(runtime.thread_pool_available, 29);
    assert_eq!(runtime.thread_pool_waiting, 2);
    assert_eq!(runtime.pending_bg_tasks, 6);
    assert_eq!(runtime.active_threads, 47);
}

#[tokio::test]
async fn test_server_error_degrades_to_os_only_sample() {
    let server = stub_server(ResponseTemplate::new(500)).await;
    let mut collector = attach_to_self(format!("{}/metrics", server.uri()));

    let sample = collector.collect(Phase::BgCompletion).await.unwrap();

    assert!(sample.runtime.is_none());
    assert!(sample.memory_rss_bytes > 0);
    assert_eq!(sample.phase, Phase::BgCompletion);
}

#[tokio::test]
async fn test_malformed_body_degrades_to_os_only_sample() {
    let server =
        stub_server(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true}))).await;
    let mut collector = attach_to_self(format!("{}/metrics", server.uri()));

    let sample = collector.collect(Phase::Test).await.unwrap();
    assert!(sample.runtime.is_none());
}

#[tokio::test]
async fn test_unreachable_endpoint_degrades_to_os_only_sample() {
    // Port 9 (discard) is closed on any sane test host
    let mut collector = attach_to_self("http://127.0.0.1:9/metrics".to_string());

    let sample = collector.collect(Phase::Test).await.unwrap();
    assert!(sample.runtime.is_none());
}

#[tokio::test]
async fn test_timestamps_are_monotonic_across_samples() {
    let server = stub_server(ResponseTemplate::new(200).set_body_json(metrics_body(0))).await;
    let mut collector = attach_to_self(format!("{}/metrics", server.uri()));

    let first = collector.collect(Phase::Test).await.unwrap();
    let second = collector.collect(Phase::Test).await.unwrap();
    assert!(second.timestamp >= first.timestamp);
}

#[tokio::test]
async fn test_attach_fails_for_dead_pid() {
    // PID close to the default Linux pid_max, vanishingly unlikely to exist
    let result = Collector::attach(
        4_194_000,
        "http://127.0.0.1:9/metrics".to_string(),
        &HttpConfig::default(),
    );
    assert!(result.is_err());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_collect_reports_process_gone_after_exit() {
    use drainmon_core::error::CollectError;

    let mut child = std::process::Command::new("sleep")
        .arg("60")
        .spawn()
        .expect("spawn sleep");

    let mut collector = Collector::attach(
        child.id(),
        "http://127.0.0.1:9/metrics".to_string(),
        &HttpConfig::default(),
    )
    .unwrap();

    let sample = collector.collect(Phase::Test).await.unwrap();
    assert!(sample.runtime.is_none());

    child.kill().unwrap();
    child.wait().unwrap();

    let err = collector.collect(Phase::Test).await.unwrap_err();
    match err {
        CollectError::ProcessGone { pid } => assert_eq!(pid, child.id()),
    }
}
