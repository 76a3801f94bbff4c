use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::snapshot::SnapshotCell;
use crate::services::metrics::{MetricsRegistry, PollMetricsCollector};
use crate::services::transport::TransportError;

/// A recurring fetch bound to a snapshot cell.
///
/// Dropping the subscription cancels it.
pub struct PollSubscription {
    name: String,
    token: CancellationToken,
    // Held while publishing; cancel flips it under the same lock.
    active: Arc<Mutex<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl PollSubscription {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        *self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// After this returns no tick publishes, even one already in flight.
    pub fn cancel(&self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if *active {
            *active = false;
            tracing::debug!("Poll feed '{}' cancelled", self.name);
        }
        self.token.cancel();
    }

    /// Wait for the poll task to end (one-shot feeds end on their own)
    pub async fn finished(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for PollSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawns "fetch now, then every interval until cancelled" tasks
#[derive(Clone, Default)]
pub struct LivePoller {
    metrics: Option<PollMetricsCollector>,
}

impl LivePoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(PollMetricsCollector::new(metrics));
        self
    }

    /// `interval: None` makes a one-shot feed.
    ///
    /// Ticks never overlap: a fetch that outlives its interval makes the
    /// poller skip the missed ticks instead of queueing them.
    pub fn subscribe<T, F, Fut>(
        &self,
        name: impl Into<String>,
        cell: SnapshotCell<T>,
        interval: Option<Duration>,
        fetch: F,
    ) -> PollSubscription
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, TransportError>> + Send + 'static,
    {
        let name = name.into();
        let token = CancellationToken::new();
        let active = Arc::new(Mutex::new(true));

        let task = run_feed(
            name.clone(),
            cell,
            interval,
            fetch,
            token.clone(),
            active.clone(),
            self.metrics.clone(),
        );

        match interval {
            Some(period) => tracing::info!("Poll feed '{}' started every {}ms", name, period.as_millis()),
            None => tracing::info!("Poll feed '{}' started (one-shot)", name),
        }

        PollSubscription {
            name,
            token,
            active,
            handle: Some(tokio::spawn(task)),
        }
    }
}

async fn run_feed<T, F, Fut>(
    name: String,
    cell: SnapshotCell<T>,
    interval: Option<Duration>,
    fetch: F,
    token: CancellationToken,
    active: Arc<Mutex<bool>>,
    metrics: Option<PollMetricsCollector>,
) where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, TransportError>> + Send + 'static,
{
    let mut ticker = interval.map(|period| {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    });

    loop {
        // First tick of a tokio interval completes immediately
        if let Some(ticker) = ticker.as_mut() {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
        }

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            outcome = fetch() => outcome,
        };

        {
            let active = active.lock().unwrap_or_else(|e| e.into_inner());
            if !*active {
                break;
            }
            match &outcome {
                Ok(value) => cell.replace(value.clone()),
                Err(e) => cell.record_error(e.user_message()),
            }
        }

        if let Some(metrics) = &metrics {
            metrics.record_tick(&name, outcome.is_ok());
        }
        match outcome {
            Ok(_) => tracing::debug!("Poll feed '{}' refreshed", name),
            Err(e) => tracing::warn!("Poll feed '{}' tick failed: {}", name, e),
        }

        if ticker.is_none() {
            break;
        }
    }
}
