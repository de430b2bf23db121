use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Orchestration and background reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Marker snapshot refresh interval. This is the staleness bound callers
    /// of `list_markers` must tolerate.
    pub snapshot_refresh_ms: u64,
    /// Attempts per reconciliation pass for one unattached report or dirty cluster.
    pub reconcile_max_attempts: u32,
    /// First retry delay; doubles each attempt.
    pub reconcile_initial_backoff_ms: u64,
    /// Retry delay ceiling.
    pub reconcile_max_backoff_ms: u64,
    /// Interval between keepalive events.
    pub keepalive_interval_secs: u64,
    /// Capacity of the live event broadcast channel.
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    pub fn snapshot_refresh(&self) -> Duration {
        Duration::from_millis(self.snapshot_refresh_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.reconcile_initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.reconcile_max_backoff_ms)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snapshot_refresh_ms: defaults::DEFAULT_SNAPSHOT_REFRESH_MS,
            reconcile_max_attempts: defaults::DEFAULT_RECONCILE_MAX_ATTEMPTS,
            reconcile_initial_backoff_ms: defaults::DEFAULT_RECONCILE_INITIAL_BACKOFF_MS,
            reconcile_max_backoff_ms: defaults::DEFAULT_RECONCILE_MAX_BACKOFF_MS,
            keepalive_interval_secs: defaults::DEFAULT_KEEPALIVE_INTERVAL_SECS,
            event_channel_capacity: defaults::DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}
