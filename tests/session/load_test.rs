use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::common::{network_error, FakeTransport};
use sislab_client::services::session::{DemoTarget, LoadConfig, LoadGenerator, SessionRegistry};
use sislab_client::services::transport::Transport;

#[tokio::test(start_paused = true)]
async fn test_five_workers_hit_target_every_cycle() {
    let fake = FakeTransport::json(serde_json::json!({"server": "8001"}));
    let transport: Arc<dyn Transport> = fake.clone();
    let generator = LoadGenerator::new(transport, SessionRegistry::new());

    let session = generator.start_target(DemoTarget::IpHash).unwrap();
    tokio::time::sleep(Duration::from_millis(475)).await;
    let report = session.stop_and_wait().await;

    // 5 workers, one request at 0ms then one every 50ms
    assert_eq!(report.requests_issued, 50);
    assert_eq!(fake.calls(), 50);
    assert_eq!(report.target, "/demo/ip/");
    assert_eq!(report.label, "IP Hash");
    assert!(fake.requests().iter().all(|r| r.path == "/demo/ip/"));
}

#[tokio::test(start_paused = true)]
async fn test_stop_ends_workers_within_one_cycle_and_no_more_requests() {
    let fake = FakeTransport::json(serde_json::Value::Null);
    let transport: Arc<dyn Transport> = fake.clone();
    let registry = SessionRegistry::new();
    let generator = LoadGenerator::new(transport, registry.clone());

    let mut session = generator.start("/demo/random/", "Random").unwrap();
    tokio::time::sleep(Duration::from_millis(220)).await;

    let stopped_at = Instant::now();
    session.stop();
    session.join().await;
    assert!(stopped_at.elapsed() <= Duration::from_millis(50));
    assert!(registry.is_idle());

    let issued = fake.calls();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fake.calls(), issued);
    assert_eq!(session.requests_issued() as usize, issued);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_ignored_and_workers_keep_going() {
    let fake = FakeTransport::new(|_, _| Err(network_error()));
    let transport: Arc<dyn Transport> = fake.clone();
    let generator = LoadGenerator::with_config(
        transport,
        SessionRegistry::new(),
        LoadConfig {
            workers: 2,
            delay: Duration::from_millis(100),
        },
    );

    let session = generator.start_target(DemoTarget::LeastConnections).unwrap();
    tokio::time::sleep(Duration::from_millis(450)).await;
    let report = session.stop_and_wait().await;

    assert_eq!(report.requests_issued, 10);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_slow_in_flight_requests() {
    let fake = FakeTransport::with_latency(Duration::from_secs(5), |_, _| {
        Ok(sislab_client::services::transport::ApiResponse::new(200, ""))
    });
    let transport: Arc<dyn Transport> = fake.clone();
    let generator = LoadGenerator::new(transport, SessionRegistry::new());

    let mut session = generator.start_target(DemoTarget::UriHash).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let stopped_at = Instant::now();
    session.stop();
    session.join().await;

    assert!(stopped_at.elapsed() <= Duration::from_millis(50));
    assert_eq!(fake.calls(), 5);
    assert_eq!(session.requests_issued(), 5);
}
