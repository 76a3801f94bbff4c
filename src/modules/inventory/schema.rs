use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// DATA SOURCE
// =============================================================================

/// Which storage path served a read or accepted a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataSource {
    MySql,
    RedisCache,
    RedisEmpty,
    RedisBackup,
    Other(String),
}

impl DataSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MySql => "MySQL",
            Self::RedisCache => "REDIS_CACHE",
            Self::RedisEmpty => "REDIS_EMPTY",
            Self::RedisBackup => "REDIS_BACKUP",
            Self::Other(s) => s,
        }
    }

    /// True when the primary store was bypassed
    pub fn is_backup(&self) -> bool {
        !matches!(self, Self::MySql)
    }
}

impl From<String> for DataSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "MySQL" => Self::MySql,
            "REDIS_CACHE" => Self::RedisCache,
            "REDIS_EMPTY" => Self::RedisEmpty,
            "REDIS_BACKUP" => Self::RedisBackup,
            _ => Self::Other(value),
        }
    }
}

impl From<DataSource> for String {
    fn from(value: DataSource) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// GLOBAL INVENTORY (MySQL with Redis fallback)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCreate {
    pub code: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub status: String,
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub code: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub acquisition_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemsPage {
    pub source: DataSource,
    #[serde(default)]
    pub data: Vec<InventoryItem>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateItemResponse {
    pub source: DataSource,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub lab_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub technician: Option<String>,
    #[serde(default)]
    pub last_date: Option<String>,
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_desc: Option<String>,
}

// =============================================================================
// LABORATORIES (MongoDB)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub specs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laboratory {
    #[serde(alias = "_id", default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<LabItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewLaboratory {
    pub name: String,
    pub location: String,
    pub description: String,
    pub items: Vec<LabItem>,
}

impl NewLaboratory {
    /// Labs are always created without machines
    pub fn new(name: impl Into<String>, location: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            description: description.into(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
