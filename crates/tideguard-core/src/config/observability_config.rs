use serde::{Deserialize, Serialize};

use super::defaults;

/// Observability subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
    /// Window for counting classifier and scorer fallbacks.
    pub alert_window_secs: i64,
    /// More fallbacks than this inside the window raise a warning.
    pub alert_warning_fallbacks: usize,
    /// A component degraded without recovery for this long is critical.
    pub alert_critical_secs: i64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            log_json: defaults::DEFAULT_LOG_JSON,
            alert_window_secs: defaults::DEFAULT_ALERT_WINDOW_SECS,
            alert_warning_fallbacks: defaults::DEFAULT_ALERT_WARNING_FALLBACKS,
            alert_critical_secs: defaults::DEFAULT_ALERT_CRITICAL_SECS,
        }
    }
}
