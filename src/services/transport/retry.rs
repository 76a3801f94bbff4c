use rand::Rng;
use std::time::Duration;

use super::types::ApiRequest;

/// Retry decision and delay schedule
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub base_delay_ms: u64,
    pub multiplier: u32,
    pub max_attempts: u32,
    pub max_delay_ms: u64,
    pub jitter_factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,   // 1 second
            multiplier: 2,
            max_attempts: 3,       // 3 attempts in total
            max_delay_ms: 30_000,  // 30 seconds
            jitter_factor: 0.0,
        }
    }
}

impl BackoffPolicy {
    /// Delay before the retry that follows failed attempt `attempt` (1-based)
    /// Formula: delay = min(base × multiplier^(attempt-1) × (1 ± jitter), max_delay)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let exponential = self.base_delay_ms as f64 * (self.multiplier as f64).powi(exponent);

        let with_jitter = if self.jitter_factor > 0.0 {
            let mut rng = rand::rng();
            exponential * (1.0 + (rng.random::<f64>() * 2.0 - 1.0) * self.jitter_factor)
        } else {
            exponential
        };

        let capped = with_jitter.min(self.max_delay_ms as f64).max(0.0);

        Duration::from_millis(capped as u64)
    }

    /// Whether another attempt may follow `attempts` failed ones
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Every delay a fully-retried request would sleep through
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts)
            .map(|attempt| self.delay_for(attempt))
            .collect()
    }
}

/// A request plus its own retry history. Never shared between calls.
#[derive(Debug)]
pub struct RequestAttempt {
    request: ApiRequest,
    attempts: u32,
    max_attempts: u32,
}

impl RequestAttempt {
    pub fn new(request: ApiRequest, max_attempts: u32) -> Self {
        Self {
            request,
            attempts: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Count one failed attempt and return the new total
    pub fn record_failure(&mut self) -> u32 {
        self.attempts = (self.attempts + 1).min(self.max_attempts);
        self.attempts
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
