use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

use super::classifier;

/// One logical call against the backend. Retries replay it unchanged.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub idempotency_key: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            idempotency_key: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, TransportError> {
        let value = serde_json::to_value(body).map_err(|e| {
            TransportError::application(format!("Could not encode request body: {}", e), 0)
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Sent as `Idempotency-Key`; stays identical across retries of this request.
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Successful (2xx) response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    /// Attempts it took to obtain this response
    pub attempts: u32,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            attempts: 1,
        }
    }

    /// Decode the body. A 2xx body with an unexpected shape is an application error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        let body = if self.body.trim().is_empty() { "null" } else { self.body.as_str() };
        serde_json::from_str(body).map_err(|e| {
            TransportError::application(
                format!("Unexpected response body: {}", e),
                self.attempts,
            )
        })
    }
}

/// Transport-level failure code, the part of a failure not carried by the status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    /// Client-side timeout (the request was aborted locally)
    Timeout,
    /// Connection could not be established
    Connect,
    /// Response body could not be read
    Body,
    Other,
}

/// Raw description of one failed attempt; input of the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub status: Option<u16>,
    pub code: Option<FailureCode>,
    pub message: String,
    /// Backend-provided `detail`, when the body carried one
    pub detail: Option<String>,
}

impl FailureRecord {
    pub fn no_response(code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: Some(code),
            message: message.into(),
            detail: None,
        }
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        Self {
            status: Some(status),
            code: None,
            message: format!("Request failed with status code {}", status),
            detail: extract_detail(body),
        }
    }

    pub fn has_response(&self) -> bool {
        self.status.is_some()
    }
}

/// FastAPI errors come back as `{"detail": "..."}` or `{"detail": [..]}`
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Error taxonomy shared by every component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Timeout,
    ServerUnavailable,
    ClientError,
    ServerError,
    Application,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::ServerUnavailable => "server_unavailable",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
            Self::Application => "application",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::ServerUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} error after {attempts} attempt(s): {message}", message = .last_error.message)]
pub struct TransportError {
    pub kind: ErrorKind,
    pub attempts: u32,
    pub last_error: FailureRecord,
}

impl TransportError {
    pub fn new(last_error: FailureRecord, attempts: u32) -> Self {
        Self {
            kind: classifier::classify(&last_error),
            attempts,
            last_error,
        }
    }

    pub fn application(message: impl Into<String>, attempts: u32) -> Self {
        Self {
            kind: ErrorKind::Application,
            attempts,
            last_error: FailureRecord {
                status: None,
                code: None,
                message: message.into(),
                detail: None,
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.last_error.status
    }

    pub fn detail(&self) -> Option<&str> {
        self.last_error.detail.as_deref()
    }

    /// One human-readable line for alerts and CLI output
    pub fn user_message(&self) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_string();
        }
        match self.kind {
            ErrorKind::Timeout => "Timeout: the server took too long to respond".to_string(),
            ErrorKind::Network => "Network error: check that the server is reachable".to_string(),
            ErrorKind::ServerUnavailable => format!(
                "Service unavailable after {} attempt(s), the cluster may be failing over",
                self.attempts
            ),
            ErrorKind::ClientError | ErrorKind::ServerError => self.last_error.message.clone(),
            ErrorKind::Application => format!("Unexpected server reply: {}", self.last_error.message),
        }
    }
}
