use crate::modules::system::{ServerStatus, SystemCrud};
use crate::services::poller::SnapshotCell;
use crate::services::transport::TransportError;

#[derive(Debug, thiserror::Error)]
#[error("Failed to reset counters: {}", .0.user_message())]
pub struct ResetError(#[from] pub TransportError);

/// Zeroes the backend request counters and the locally held copy
#[derive(Clone)]
pub struct ResetCoordinator {
    system: SystemCrud,
    cluster: SnapshotCell<Vec<ServerStatus>>,
}

impl ResetCoordinator {
    pub fn new(system: SystemCrud, cluster: SnapshotCell<Vec<ServerStatus>>) -> Self {
        Self { system, cluster }
    }

    /// Returns how many held entries were zeroed. No re-fetch happens; the
    /// next cluster tick overwrites the local values with server truth.
    pub async fn reset(&self) -> Result<usize, ResetError> {
        self.system.reset_counters().await?;

        let mut zeroed = 0;
        self.cluster.modify_value(|servers| {
            for server in servers.iter_mut() {
                server.requests = 0;
            }
            zeroed = servers.len();
        });

        tracing::info!("🔁 Request counters reset ({} node(s) zeroed locally)", zeroed);
        Ok(zeroed)
    }
}
