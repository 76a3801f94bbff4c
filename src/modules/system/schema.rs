use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER HEARTBEAT (/system/status)
// =============================================================================

/// One backend node as seen by the heartbeat feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(deserialize_with = "string_or_number")]
    pub port: String,
    pub status: String,
    #[serde(default)]
    pub requests: u64,
}

impl ServerStatus {
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("online")
    }
}

/// Ports come back as numbers from some nodes and strings from others
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

// =============================================================================
// DEPENDENCY HEALTH (/health)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
    Down,
}

impl OverallStatus {
    /// Both stores up → healthy, exactly one up → degraded, none → down
    pub fn derive(mysql: bool, redis: bool) -> Self {
        match (mysql, redis) {
            (true, true) => Self::Healthy,
            (false, false) => Self::Down,
            _ => Self::Degraded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub mysql: bool,
    pub redis: bool,
    /// What the backend claimed; [`HealthSnapshot::overall`] is authoritative
    #[serde(rename = "status", default)]
    pub reported_status: Option<String>,
}

impl HealthSnapshot {
    pub fn overall(&self) -> OverallStatus {
        OverallStatus::derive(self.mysql, self.redis)
    }

    pub fn disagrees_with_backend(&self) -> bool {
        self.reported_status
            .as_deref()
            .is_some_and(|reported| !reported.eq_ignore_ascii_case(self.overall().as_str()))
    }
}

// =============================================================================
// CACHE / PRIMARY STORE CONSISTENCY (/sync/status)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    #[serde(default)]
    pub is_consistent: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cache_items: u64,
    #[serde(default)]
    pub pending_creates: u64,
    #[serde(default)]
    pub pending_updates: u64,
    #[serde(default)]
    pub pending_deletes: u64,
    #[serde(default)]
    pub mysql_available: Option<bool>,
    #[serde(default)]
    pub redis_available: Option<bool>,
    #[serde(default)]
    pub consistency_details: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl SyncSnapshot {
    pub fn pending_total(&self) -> u64 {
        self.pending_creates + self.pending_updates + self.pending_deletes
    }
}
