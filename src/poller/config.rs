//! Polling configuration.
//!
//! # Pacing Strategy
//!
//! - **Backoff floor**: 10 seconds between sweeps when the remote is healthy
//! - **Backoff ceiling**: 60 seconds under sustained failure (bounded
//!   staleness)
//! - **Lookback window**: the 100 most recent local runs per repository are
//!   diffed against each fetch; older runs that change remotely are accepted
//!   staleness
//! - **Fetch timeout**: no remote call is allowed to block a sweep
//!   indefinitely

use std::time::Duration;

use crate::github::DEFAULT_PAGE_SIZE;

/// Default delay between sweeps when the remote is healthy (10 seconds).
const DEFAULT_BACKOFF_FLOOR_SECS: u64 = 10;

/// Default ceiling for the widened delay under failure (60 seconds).
const DEFAULT_BACKOFF_CEILING_SECS: u64 = 60;

/// Default number of recent local runs diffed per repository.
const DEFAULT_LOOKBACK_RUNS: usize = 100;

/// Default per-fetch timeout (30 seconds); expiry classifies as transient.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Configuration for the poll scheduler and reconciler.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between sweeps when every fetch succeeded.
    ///
    /// Default: 10 seconds. Configure via `RUN_WATCH_BACKOFF_FLOOR_SECS`.
    pub backoff_floor: Duration,

    /// Upper bound for the widened delay under sustained failure.
    ///
    /// Default: 60 seconds. Configure via `RUN_WATCH_BACKOFF_CEILING_SECS`.
    pub backoff_ceiling: Duration,

    /// How many recent local runs per repository form the diff window.
    ///
    /// Default: 100. Configure via `RUN_WATCH_LOOKBACK_RUNS`.
    pub lookback_runs: usize,

    /// Timeout applied to each remote fetch.
    ///
    /// Default: 30 seconds.
    pub fetch_timeout: Duration,

    /// How many recent runs to request from the remote per repository.
    ///
    /// Default: 30.
    pub page_size: u8,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollerConfig {
    /// Creates a new `PollerConfig` with default values.
    pub fn new() -> Self {
        PollerConfig {
            backoff_floor: Duration::from_secs(DEFAULT_BACKOFF_FLOOR_SECS),
            backoff_ceiling: Duration::from_secs(DEFAULT_BACKOFF_CEILING_SECS),
            lookback_runs: DEFAULT_LOOKBACK_RUNS,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Creates a `PollerConfig` from environment variables.
    ///
    /// Reads `RUN_WATCH_BACKOFF_FLOOR_SECS`, `RUN_WATCH_BACKOFF_CEILING_SECS`,
    /// and `RUN_WATCH_LOOKBACK_RUNS`. Other values use defaults.
    pub fn from_env() -> Self {
        let defaults = Self::new();

        let floor_secs = env_u64("RUN_WATCH_BACKOFF_FLOOR_SECS")
            .unwrap_or(DEFAULT_BACKOFF_FLOOR_SECS);
        let ceiling_secs = env_u64("RUN_WATCH_BACKOFF_CEILING_SECS")
            .unwrap_or(DEFAULT_BACKOFF_CEILING_SECS);
        let lookback = env_u64("RUN_WATCH_LOOKBACK_RUNS")
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_LOOKBACK_RUNS);

        PollerConfig {
            backoff_floor: Duration::from_secs(floor_secs),
            backoff_ceiling: Duration::from_secs(ceiling_secs.max(floor_secs)),
            lookback_runs: lookback,
            ..defaults
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = PollerConfig::new();

        assert_eq!(config.backoff_floor, Duration::from_secs(10));
        assert_eq!(config.backoff_ceiling, Duration::from_secs(60));
        assert_eq!(config.lookback_runs, 100);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, 30);
    }
}
