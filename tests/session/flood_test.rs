use std::sync::Arc;
use std::time::Duration;

use crate::common::{status_error, FakeTransport};
use sislab_client::modules::inventory::InventoryCrud;
use sislab_client::services::metrics::MetricsRegistry;
use sislab_client::services::session::{BulkFlooder, FloodConfig, SessionRegistry};
use sislab_client::services::transport::{ApiResponse, Transport};

fn created(source: &str) -> ApiResponse {
    let body = serde_json::json!({"source": source, "status": "created", "data": {}});
    ApiResponse::new(201, body.to_string())
}

fn flooder(fake: &Arc<FakeTransport>, registry: &SessionRegistry) -> BulkFlooder {
    let transport: Arc<dyn Transport> = fake.clone();
    BulkFlooder::new(InventoryCrud::new(transport), registry.clone())
}

#[tokio::test(start_paused = true)]
async fn test_all_successes_create_exactly_ten() {
    let fake = FakeTransport::new(|_, _| Ok(created("MySQL")));
    let registry = SessionRegistry::new();

    let session = flooder(&fake, &registry).start().unwrap();
    let progress = session.wait().await;

    assert_eq!(progress.created, 10);
    assert_eq!(progress.attempted, 10);
    assert_eq!(progress.failed, 0);
    assert!(progress.finished);
    assert_eq!(fake.calls(), 10);
    assert!(registry.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_every_third_failure_is_skipped() {
    let fake = FakeTransport::new(|_, call| {
        if call % 3 == 0 {
            Err(status_error(500))
        } else {
            Ok(created("MySQL"))
        }
    });
    let registry = SessionRegistry::new();

    let progress = flooder(&fake, &registry).start().unwrap().wait().await;

    assert_eq!(progress.attempted, 10);
    assert_eq!(progress.created, 7);
    assert_eq!(progress.failed, 3);
    assert!(progress.finished);
    assert!(registry.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_items_are_sequential_and_randomized() {
    let fake = FakeTransport::with_latency(Duration::from_millis(30), |_, _| Ok(created("MySQL")));
    let registry = SessionRegistry::new();

    let started = tokio::time::Instant::now();
    flooder(&fake, &registry).start().unwrap().wait().await;

    // 10 × (30ms call + 100ms pause), one at a time
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1300));
    assert!(elapsed < Duration::from_millis(1350));

    let requests = fake.requests();
    assert!(requests.iter().all(|r| r.path == "/laboratories/items"));
    assert!(requests.iter().all(|r| r.idempotency_key.is_some()));
    let codes: std::collections::HashSet<String> = requests
        .iter()
        .map(|r| r.body.as_ref().unwrap()["code"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(codes.len(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_backup_writes_are_counted() {
    let fake = FakeTransport::new(|_, call| {
        Ok(created(if call > 4 { "REDIS_BACKUP" } else { "MySQL" }))
    });
    let registry = SessionRegistry::new();
    let metrics = MetricsRegistry::new().unwrap();
    let registry = registry.with_metrics(metrics.clone());

    let progress = flooder(&fake, &registry).start().unwrap().wait().await;

    assert_eq!(progress.created, 10);
    assert_eq!(progress.saved_to_backup, 6);
    let exported = metrics.export().unwrap();
    assert!(exported.contains("sislab_flood_items_total{source=\"REDIS_BACKUP\"} 6"));
    assert!(exported.contains("sislab_flood_items_total{source=\"MySQL\"} 4"));
}

#[tokio::test(start_paused = true)]
async fn test_stop_ends_campaign_early() {
    let fake = FakeTransport::new(|_, _| Ok(created("MySQL")));
    let registry = SessionRegistry::new();

    let session = flooder(&fake, &registry).start().unwrap();
    let mut progress = session.subscribe();
    while progress.borrow_and_update().created < 3 {
        progress.changed().await.unwrap();
    }
    session.stop();
    let summary = session.wait().await;

    assert_eq!(summary.created, 3);
    assert!(summary.finished);
    assert!(registry.is_idle());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(fake.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_custom_budget() {
    let fake = FakeTransport::new(|_, _| Ok(created("MySQL")));
    let registry = SessionRegistry::new();
    let transport: Arc<dyn Transport> = fake.clone();
    let flooder = BulkFlooder::with_config(
        InventoryCrud::new(transport),
        registry,
        FloodConfig {
            max_items: 4,
            delay: Duration::from_millis(10),
        },
    );

    let progress = flooder.start().unwrap().wait().await;
    assert_eq!(progress.created, 4);
    assert_eq!(progress.max_items, 4);
}
