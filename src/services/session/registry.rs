use std::fmt;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::services::metrics::{MetricsRegistry, SessionMetricsCollector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Load,
    Flood,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Load => "load",
            SessionKind::Flood => "flood",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("A {active} session is already running")]
    AlreadyRunning { active: SessionKind },
}

/// Proof of owning the active-session slot
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    kind: SessionKind,
    token: CancellationToken,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct ActiveSession {
    id: Uuid,
    kind: SessionKind,
    token: CancellationToken,
}

/// Zero or one synthetic-activity session at a time, process-wide
#[derive(Clone, Default)]
pub struct SessionRegistry {
    slot: Arc<Mutex<Option<ActiveSession>>>,
    metrics: Option<SessionMetricsCollector>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(SessionMetricsCollector::new(metrics));
        self
    }

    /// Atomic test-and-set of the slot. On failure nothing changes.
    pub fn try_start(&self, kind: SessionKind) -> Result<SessionHandle, SessionError> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(active) = slot.as_ref() {
            return Err(SessionError::AlreadyRunning { active: active.kind });
        }

        let handle = SessionHandle {
            id: Uuid::new_v4(),
            kind,
            token: CancellationToken::new(),
        };
        *slot = Some(ActiveSession {
            id: handle.id,
            kind,
            token: handle.token.clone(),
        });

        if let Some(metrics) = &self.metrics {
            metrics.set_active(kind.as_str(), true);
        }
        tracing::info!("▶️ {} session {} started", kind, handle.id);

        Ok(handle)
    }

    /// Idempotent: stopping a finished or unknown session does nothing.
    /// Returns whether this call released the slot.
    pub fn stop(&self, handle: &SessionHandle) -> bool {
        handle.token.cancel();

        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(active) if active.id == handle.id => {
                active.token.cancel();
                *slot = None;
            }
            _ => return false,
        }
        drop(slot);

        if let Some(metrics) = &self.metrics {
            metrics.set_active(handle.kind.as_str(), false);
        }
        tracing::info!("⏹️ {} session {} stopped", handle.kind, handle.id);
        true
    }

    pub fn active(&self) -> Option<SessionKind> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|active| active.kind)
    }

    pub fn is_idle(&self) -> bool {
        self.active().is_none()
    }

    pub(crate) fn metrics(&self) -> Option<&SessionMetricsCollector> {
        self.metrics.as_ref()
    }
}
