//! Engine runtime configuration.
//!
//! Tunables for the timers and the mock backend. Loaded from
//! `config.toml` in the pulse config directory by the infrastructure
//! crate; every field has an in-code default so a missing or partial
//! file is fine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_live_tick_secs() -> u64 {
    5
}

fn default_fetch_latency_ms() -> u64 {
    800
}

fn default_login_latency_ms() -> u64 {
    1000
}

fn default_fetch_failure_rate() -> f64 {
    0.05
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Period of the live-update simulator, in seconds.
    pub live_tick_secs: u64,
    /// Simulated latency of a series fetch, in milliseconds.
    pub fetch_latency_ms: u64,
    /// Simulated latency of a login call, in milliseconds.
    pub login_latency_ms: u64,
    /// Probability that a series fetch fails with a transport error.
    pub fetch_failure_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            live_tick_secs: default_live_tick_secs(),
            fetch_latency_ms: default_fetch_latency_ms(),
            login_latency_ms: default_login_latency_ms(),
            fetch_failure_rate: default_fetch_failure_rate(),
        }
    }
}

impl EngineConfig {
    pub fn live_tick_interval(&self) -> Duration {
        Duration::from_secs(self.live_tick_secs)
    }

    pub fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }

    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.login_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.live_tick_secs, 5);
        assert_eq!(config.fetch_latency_ms, 800);
        assert_eq!(config.login_latency_ms, 1000);
        assert!((config.fetch_failure_rate - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str("live_tick_secs = 1").unwrap();
        assert_eq!(config.live_tick_secs, 1);
        assert_eq!(config.fetch_latency_ms, 800);
    }
}
