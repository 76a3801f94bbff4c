use std::sync::Arc;

use crate::modules::system::schema::{HealthSnapshot, ServerStatus, SyncSnapshot};
use crate::services::transport::{ApiRequest, Transport, TransportError};

/// Cluster observation and control calls
#[derive(Clone)]
pub struct SystemCrud {
    transport: Arc<dyn Transport>,
}

impl SystemCrud {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn cluster_status(&self) -> Result<Vec<ServerStatus>, TransportError> {
        self.transport
            .send(ApiRequest::get("/system/status"))
            .await?
            .json()
    }

    pub async fn health(&self) -> Result<HealthSnapshot, TransportError> {
        self.transport.send(ApiRequest::get("/health")).await?.json()
    }

    pub async fn sync_status(&self) -> Result<SyncSnapshot, TransportError> {
        self.transport.send(ApiRequest::get("/sync/status")).await?.json()
    }

    /// Zero every node's request counter on the backend
    pub async fn reset_counters(&self) -> Result<(), TransportError> {
        self.transport.send(ApiRequest::delete("/system/reset")).await?;
        Ok(())
    }
}
