use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("Exposition is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Central metrics registry for the resilience client
pub struct MetricsRegistry {
    registry: Registry,

    // Transport Metrics
    pub transport_attempts_total: CounterVec,
    pub transport_retries_total: CounterVec,
    pub transport_request_duration_seconds: HistogramVec,

    // Poller Metrics
    pub poll_ticks_total: CounterVec,

    // Session Metrics
    pub session_requests_total: CounterVec,
    pub session_active: GaugeVec,
    pub flood_items_total: CounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Arc<Self>, MetricsError> {
        let registry = Registry::new();

        // Transport Metrics
        let transport_attempts_total = CounterVec::new(
            Opts::new("transport_attempts_total", "Total outbound attempts, retries included")
                .namespace("sislab"),
            &["method", "outcome"],
        )?;
        registry.register(Box::new(transport_attempts_total.clone()))?;

        let transport_retries_total = CounterVec::new(
            Opts::new("transport_retries_total", "Retries scheduled by the transport")
                .namespace("sislab"),
            &["kind"],
        )?;
        registry.register(Box::new(transport_retries_total.clone()))?;

        let transport_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new("transport_request_duration_seconds", "Single attempt duration")
                .namespace("sislab")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["method"],
        )?;
        registry.register(Box::new(transport_request_duration_seconds.clone()))?;

        // Poller Metrics
        let poll_ticks_total = CounterVec::new(
            Opts::new("poll_ticks_total", "Poll ticks per feed").namespace("sislab"),
            &["feed", "outcome"],
        )?;
        registry.register(Box::new(poll_ticks_total.clone()))?;

        // Session Metrics
        let session_requests_total = CounterVec::new(
            Opts::new("session_requests_total", "Requests issued by synthetic sessions")
                .namespace("sislab"),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(session_requests_total.clone()))?;

        let session_active = GaugeVec::new(
            Opts::new("session_active", "1 while a session of this kind holds the slot")
                .namespace("sislab"),
            &["kind"],
        )?;
        registry.register(Box::new(session_active.clone()))?;

        let flood_items_total = CounterVec::new(
            Opts::new("flood_items_total", "Items created by the flooder, by storage path")
                .namespace("sislab"),
            &["source"],
        )?;
        registry.register(Box::new(flood_items_total.clone()))?;

        Ok(Arc::new(Self {
            registry,
            transport_attempts_total,
            transport_retries_total,
            transport_request_duration_seconds,
            poll_ticks_total,
            session_requests_total,
            session_active,
            flood_items_total,
        }))
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Get the underlying registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
