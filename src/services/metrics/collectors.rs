use std::sync::Arc;
use std::time::Duration;

use super::MetricsRegistry;

/// Collector for transport metrics
#[derive(Clone)]
pub struct TransportMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl TransportMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn record_attempt(&self, method: &str, outcome: &str, duration: Duration) {
        self.metrics
            .transport_attempts_total
            .with_label_values(&[method, outcome])
            .inc();

        self.metrics
            .transport_request_duration_seconds
            .with_label_values(&[method])
            .observe(duration.as_secs_f64());
    }

    pub fn record_retry(&self, kind: &str) {
        self.metrics
            .transport_retries_total
            .with_label_values(&[kind])
            .inc();
    }
}

/// Collector for poll feed metrics
#[derive(Clone)]
pub struct PollMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl PollMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn record_tick(&self, feed: &str, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.metrics
            .poll_ticks_total
            .with_label_values(&[feed, outcome])
            .inc();
    }
}

/// Collector for synthetic session metrics
#[derive(Clone)]
pub struct SessionMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl SessionMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn record_request(&self, kind: &str, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.metrics
            .session_requests_total
            .with_label_values(&[kind, outcome])
            .inc();
    }

    pub fn set_active(&self, kind: &str, active: bool) {
        self.metrics
            .session_active
            .with_label_values(&[kind])
            .set(if active { 1.0 } else { 0.0 });
    }

    pub fn record_flood_item(&self, source: &str) {
        self.metrics
            .flood_items_total
            .with_label_values(&[source])
            .inc();
    }
}
