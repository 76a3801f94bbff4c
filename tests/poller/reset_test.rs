use std::sync::Arc;
use std::time::Duration;

use crate::common::{status_error, FakeTransport};
use crate::poller::dashboard_test::cluster_backend;
use sislab_client::config::FeedIntervals;
use sislab_client::modules::inventory::InventoryCrud;
use sislab_client::modules::system::SystemCrud;
use sislab_client::services::dashboard::Dashboard;
use sislab_client::services::poller::LivePoller;
use sislab_client::services::transport::{ErrorKind, Transport};

fn dashboard(transport: Arc<FakeTransport>) -> Dashboard {
    let transport: Arc<dyn Transport> = transport;
    Dashboard::new(
        LivePoller::new(),
        SystemCrud::new(transport.clone()),
        InventoryCrud::new(transport),
        FeedIntervals::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_reset_zeroes_held_counts_before_next_tick() {
    let transport = FakeTransport::new(cluster_backend);
    let dashboard = dashboard(transport.clone());
    dashboard.start();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let zeroed = dashboard.reset_coordinator().reset().await.unwrap();

    assert_eq!(zeroed, 2);
    let cluster = dashboard.cluster().value().unwrap();
    assert!(cluster.iter().all(|server| server.requests == 0));
    assert!(transport
        .requests()
        .iter()
        .any(|r| r.path == "/system/reset" && r.method == reqwest::Method::DELETE));

    // next tick brings server truth back
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(dashboard.cluster().value().unwrap()[0].requests, 40);
}

#[tokio::test(start_paused = true)]
async fn test_failed_reset_leaves_counts_untouched() {
    let transport = FakeTransport::new(|request, call| {
        if request.path == "/system/reset" {
            return Err(status_error(500));
        }
        cluster_backend(request, call)
    });
    let dashboard = dashboard(transport.clone());
    dashboard.start();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let err = dashboard.reset_coordinator().reset().await.unwrap_err();

    assert_eq!(err.0.kind, ErrorKind::ServerError);
    assert!(err.to_string().starts_with("Failed to reset counters"));
    assert_eq!(dashboard.cluster().value().unwrap()[0].requests, 40);
}

#[tokio::test]
async fn test_reset_before_any_snapshot_zeroes_nothing() {
    let transport = FakeTransport::new(cluster_backend);
    let dashboard = dashboard(transport.clone());

    let zeroed = dashboard.reset_coordinator().reset().await.unwrap();

    assert_eq!(zeroed, 0);
    assert!(dashboard.cluster().value().is_none());
    assert_eq!(transport.calls(), 1);
}
