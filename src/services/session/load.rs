use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::registry::{SessionError, SessionHandle, SessionKind, SessionRegistry};
use crate::services::metrics::SessionMetricsCollector;
use crate::services::transport::{ApiRequest, Transport};

/// Demo endpoints behind the load balancer, one per balancing algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoTarget {
    RoundRobin,
    LeastConnections,
    PowerOfTwo,
    IpHash,
    UriHash,
    Random,
}

impl DemoTarget {
    pub const ALL: [DemoTarget; 6] = [
        DemoTarget::RoundRobin,
        DemoTarget::LeastConnections,
        DemoTarget::PowerOfTwo,
        DemoTarget::IpHash,
        DemoTarget::UriHash,
        DemoTarget::Random,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            DemoTarget::RoundRobin => "/",
            DemoTarget::LeastConnections => "/demo/least/",
            DemoTarget::PowerOfTwo => "/demo/two/",
            DemoTarget::IpHash => "/demo/ip/",
            DemoTarget::UriHash => "/demo/uri/lab-inventory",
            DemoTarget::Random => "/demo/random/",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DemoTarget::RoundRobin => "Round Robin",
            DemoTarget::LeastConnections => "Least Connections",
            DemoTarget::PowerOfTwo => "Power of Two Choices",
            DemoTarget::IpHash => "IP Hash",
            DemoTarget::UriHash => "URI Hash",
            DemoTarget::Random => "Random",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            DemoTarget::RoundRobin => "round-robin",
            DemoTarget::LeastConnections => "least",
            DemoTarget::PowerOfTwo => "two",
            DemoTarget::IpHash => "ip",
            DemoTarget::UriHash => "uri",
            DemoTarget::Random => "random",
        }
    }
}

impl fmt::Display for DemoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DemoTarget {
    type Err = String;

    /// Accepts the short key (`least`) or the path (`/demo/least/`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        DemoTarget::ALL
            .into_iter()
            .find(|target| target.key() == needle || target.path() == needle)
            .ok_or_else(|| {
                let known: Vec<&str> = DemoTarget::ALL.iter().map(|t| t.key()).collect();
                format!("Unknown demo target '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub workers: usize,
    /// Pause between a worker's requests
    pub delay: Duration,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            delay: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub target: String,
    pub label: String,
    pub requests_issued: u64,
    pub elapsed: Duration,
}

/// Launches fire-and-forget request storms against one target
#[derive(Clone)]
pub struct LoadGenerator {
    transport: Arc<dyn Transport>,
    registry: SessionRegistry,
    config: LoadConfig,
}

impl LoadGenerator {
    pub fn new(transport: Arc<dyn Transport>, registry: SessionRegistry) -> Self {
        Self::with_config(transport, registry, LoadConfig::default())
    }

    pub fn with_config(transport: Arc<dyn Transport>, registry: SessionRegistry, config: LoadConfig) -> Self {
        Self {
            transport,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    pub fn start(&self, path: impl Into<String>, label: impl Into<String>) -> Result<LoadSession, SessionError> {
        let handle = self.registry.try_start(SessionKind::Load)?;
        let path = path.into();
        let label = label.into();
        let issued = Arc::new(AtomicU64::new(0));

        let workers = (0..self.config.workers)
            .map(|_| {
                tokio::spawn(run_worker(
                    self.transport.clone(),
                    path.clone(),
                    self.config.delay,
                    handle.token().clone(),
                    issued.clone(),
                    self.registry.metrics().cloned(),
                ))
            })
            .collect();

        tracing::info!(
            "🚀 Load session on {} ({}) with {} workers",
            path,
            label,
            self.config.workers
        );

        Ok(LoadSession {
            handle,
            registry: self.registry.clone(),
            target: path,
            label,
            issued,
            workers,
            started: Instant::now(),
        })
    }

    pub fn start_target(&self, target: DemoTarget) -> Result<LoadSession, SessionError> {
        self.start(target.path(), target.label())
    }
}

async fn run_worker(
    transport: Arc<dyn Transport>,
    path: String,
    delay: Duration,
    token: CancellationToken,
    issued: Arc<AtomicU64>,
    metrics: Option<SessionMetricsCollector>,
) {
    loop {
        // Counted on first poll, so a request the stop pre-empts is never counted
        let send = async {
            issued.fetch_add(1, Ordering::Relaxed);
            transport.send(ApiRequest::get(path.as_str())).await
        };
        // Outcome deliberately ignored; only counted for metrics
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            outcome = send => outcome,
        };
        if let Some(metrics) = &metrics {
            metrics.record_request(SessionKind::Load.as_str(), outcome.is_ok());
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// A running load campaign. Dropping it stops the campaign.
pub struct LoadSession {
    handle: SessionHandle,
    registry: SessionRegistry,
    target: String,
    label: String,
    issued: Arc<AtomicU64>,
    workers: Vec<JoinHandle<()>>,
    started: Instant,
}

impl LoadSession {
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn requests_issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Terminal; a stopped session cannot resume
    pub fn stop(&self) {
        self.registry.stop(&self.handle);
    }

    /// Waits for every worker to exit. Only returns after `stop`.
    pub async fn join(&mut self) {
        for worker in self.workers.drain(..) {
            let _ = worker.await;
        }
    }

    pub async fn stop_and_wait(mut self) -> LoadReport {
        self.stop();
        self.join().await;

        let report = LoadReport {
            target: self.target.clone(),
            label: self.label.clone(),
            requests_issued: self.requests_issued(),
            elapsed: self.started.elapsed(),
        };
        tracing::info!(
            "🏁 Load session on {} finished: {} request(s) in {:.1}s",
            report.target,
            report.requests_issued,
            report.elapsed.as_secs_f64()
        );
        report
    }
}

impl Drop for LoadSession {
    fn drop(&mut self) {
        self.stop();
    }
}
