use std::env;
use std::time::Duration;

use crate::services::transport::BackoffPolicy;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

/// Cadence of each dashboard feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedIntervals {
    pub status: Duration,
    /// Used for the cluster feed while a load session runs
    pub fast_status: Duration,
    pub health: Duration,
    pub items: Duration,
}

impl Default for FeedIntervals {
    fn default() -> Self {
        Self {
            status: Duration::from_millis(2000),
            fast_status: Duration::from_millis(800),
            health: Duration::from_millis(10_000),
            items: Duration::from_millis(5000),
        }
    }
}

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub token: Option<String>,
    pub retry: BackoffPolicy,
    pub intervals: FeedIntervals,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same rules as `from_env`, reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("SISLAB_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:8001".to_string());

        let token = lookup("SISLAB_TOKEN").filter(|token| !token.is_empty());

        let request_timeout = millis(&lookup, "SISLAB_REQUEST_TIMEOUT_MS", 10_000)?;

        let defaults = BackoffPolicy::default();
        let max_attempts = number(&lookup, "SISLAB_RETRY_MAX_ATTEMPTS", defaults.max_attempts as u64)?;
        let retry = BackoffPolicy {
            max_attempts: u32::try_from(max_attempts).unwrap_or(u32::MAX),
            base_delay_ms: number(&lookup, "SISLAB_RETRY_BASE_DELAY_MS", defaults.base_delay_ms)?,
            ..defaults
        };

        let fallback = FeedIntervals::default();
        let intervals = FeedIntervals {
            status: millis(&lookup, "SISLAB_STATUS_INTERVAL_MS", fallback.status.as_millis() as u64)?,
            fast_status: millis(
                &lookup,
                "SISLAB_FAST_STATUS_INTERVAL_MS",
                fallback.fast_status.as_millis() as u64,
            )?,
            health: millis(&lookup, "SISLAB_HEALTH_INTERVAL_MS", fallback.health.as_millis() as u64)?,
            items: millis(&lookup, "SISLAB_ITEMS_INTERVAL_MS", fallback.items.as_millis() as u64)?,
        };

        Ok(Self {
            api_url,
            request_timeout,
            token,
            retry,
            intervals,
        })
    }
}

fn number<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber { name, value: raw.clone() })?;
    if value == 0 {
        return Err(ConfigError::Zero { name });
    }
    Ok(value)
}

fn millis<F>(lookup: &F, name: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    number(lookup, name, default).map(Duration::from_millis)
}
