use std::sync::Arc;

use crate::common::FakeTransport;
use sislab_client::modules::inventory::InventoryCrud;
use sislab_client::services::session::{
    BulkFlooder, DemoTarget, LoadGenerator, SessionError, SessionKind, SessionRegistry,
};
use sislab_client::services::transport::Transport;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts_never_both_succeed() {
    for _ in 0..50 {
        let registry = SessionRegistry::new();
        let attempts = (0..16).map(|i| {
            let registry = registry.clone();
            let kind = if i % 2 == 0 { SessionKind::Load } else { SessionKind::Flood };
            tokio::spawn(async move { registry.try_start(kind) })
        });

        let results = futures::future::join_all(attempts).await;
        let winners = results
            .into_iter()
            .map(|joined| joined.unwrap())
            .filter(|result| result.is_ok())
            .count();

        assert_eq!(winners, 1);
        assert!(registry.active().is_some());
    }
}

#[tokio::test(start_paused = true)]
async fn test_load_rejected_while_flood_runs() {
    let transport: Arc<dyn Transport> = FakeTransport::json(serde_json::json!({
        "source": "MySQL", "status": "created", "data": {}
    }));
    let registry = SessionRegistry::new();
    let flooder = BulkFlooder::new(InventoryCrud::new(transport.clone()), registry.clone());
    let generator = LoadGenerator::new(transport, registry.clone());

    let flood = flooder.start().unwrap();
    let err = generator.start_target(DemoTarget::LeastConnections).err().unwrap();

    assert_eq!(err, SessionError::AlreadyRunning { active: SessionKind::Flood });
    assert_eq!(registry.active(), Some(SessionKind::Flood));

    flood.wait().await;
    assert!(registry.is_idle());
    let load = generator.start_target(DemoTarget::LeastConnections).unwrap();
    load.stop_and_wait().await;
    assert!(registry.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_session_frees_slot() {
    let transport: Arc<dyn Transport> = FakeTransport::json(serde_json::Value::Null);
    let registry = SessionRegistry::new();
    let generator = LoadGenerator::new(transport, registry.clone());

    let session = generator.start("/", "Round Robin").unwrap();
    assert_eq!(registry.active(), Some(SessionKind::Load));
    let handle = session.handle().clone();
    drop(session);

    assert!(registry.is_idle());
    assert!(handle.is_stopped());
    // stopping again is a no-op
    assert!(!registry.stop(&handle));
}
