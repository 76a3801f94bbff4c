use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::classifier;
use super::connector::{Connector, HttpConnector};
use super::credentials::CredentialStore;
use super::retry::{BackoffPolicy, RequestAttempt};
use super::types::{ApiRequest, ApiResponse, TransportError};
use crate::services::metrics::{MetricsRegistry, TransportMetricsCollector};

/// Single chokepoint for every outbound call
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Attaches credentials, classifies failures and retries with exponential backoff.
///
/// Retries replay the exact request, so a non-idempotent write (create-item)
/// can reach the backend more than once under transient 503/504.
pub struct ResilientTransport<C = HttpConnector> {
    connector: C,
    credentials: CredentialStore,
    policy: BackoffPolicy,
    metrics: Option<TransportMetricsCollector>,
}

impl ResilientTransport<HttpConnector> {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: CredentialStore,
        policy: BackoffPolicy,
    ) -> Self {
        Self::with_connector(HttpConnector::new(base_url, timeout), credentials, policy)
    }
}

impl<C: Connector> ResilientTransport<C> {
    pub fn with_connector(connector: C, credentials: CredentialStore, policy: BackoffPolicy) -> Self {
        Self {
            connector,
            credentials,
            policy,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(TransportMetricsCollector::new(metrics));
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    fn record_attempt(&self, method: &str, outcome: &str, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_attempt(method, outcome, started.elapsed());
        }
    }
}

#[async_trait]
impl<C: Connector> Transport for ResilientTransport<C> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut attempt = RequestAttempt::new(request, self.policy.max_attempts);

        loop {
            // Re-read per attempt: a login may land between retries
            let token = self.credentials.token();
            let method = attempt.request().method.clone();
            let started = Instant::now();

            match self.connector.execute(attempt.request(), token.as_deref()).await {
                Ok(mut response) => {
                    self.record_attempt(method.as_str(), "success", started);
                    response.attempts = attempt.attempts() + 1;
                    attempt.reset();
                    return Ok(response);
                }
                Err(failure) => {
                    self.record_attempt(method.as_str(), "failure", started);
                    let attempts = attempt.record_failure();

                    if classifier::is_retryable(&failure) && self.policy.should_retry(attempts) {
                        let delay = self.policy.delay_for(attempts);
                        let kind = classifier::classify(&failure);
                        tracing::warn!(
                            "🔄 Retrying {} {} (attempt {}/{}) in {}ms: {}",
                            method,
                            attempt.request().path,
                            attempts,
                            self.policy.max_attempts,
                            delay.as_millis(),
                            failure.message
                        );
                        if let Some(metrics) = &self.metrics {
                            metrics.record_retry(kind.as_str());
                        }
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let error = TransportError::new(failure, attempts);
                    tracing::error!(
                        "❌ {} {} failed after {} attempt(s): {}",
                        method,
                        attempt.request().path,
                        attempts,
                        error.last_error.message
                    );
                    return Err(error);
                }
            }
        }
    }
}
