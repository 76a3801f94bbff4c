use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::classifier::NETWORK_ERROR_MESSAGE;
use super::credentials::attach_credentials;
use super::types::{ApiRequest, ApiResponse, FailureCode, FailureRecord};

/// Issues exactly one attempt of a request. Retry policy lives above this.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, FailureRecord>;
}

/// reqwest-backed connector pointed at the load balancer
pub struct HttpConnector {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sislab-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn failure_from(&self, e: reqwest::Error) -> FailureRecord {
        if e.is_timeout() {
            return FailureRecord::no_response(
                FailureCode::Timeout,
                format!("timeout of {}ms exceeded", self.timeout.as_millis()),
            );
        }

        let code = if e.is_connect() {
            FailureCode::Connect
        } else if e.is_body() || e.is_decode() {
            FailureCode::Body
        } else {
            FailureCode::Other
        };

        tracing::debug!("Transport failure ({:?}): {}", code, e);
        FailureRecord::no_response(code, NETWORK_ERROR_MESSAGE)
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, FailureRecord> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url_for(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }
        builder = attach_credentials(builder, bearer);

        let response = builder.send().await.map_err(|e| self.failure_from(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.failure_from(e))?;

        if (200..300).contains(&status) {
            Ok(ApiResponse::new(status, body))
        } else {
            Err(FailureRecord::from_status(status, &body))
        }
    }
}
