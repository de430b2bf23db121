use serde::{Deserialize, Serialize};

use super::defaults;

/// Review workflow configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Confidence gain since the needs-more-info decision that re-opens a cluster.
    pub reopen_delta: f64,
    /// Severity at or above which a queued cluster is flagged urgent.
    pub urgent_severity: u8,
    /// Fused confidence at or above which a queued cluster is flagged urgent.
    pub urgent_confidence: f64,
    /// Maximum accepted length of reviewer notes, in characters.
    pub max_notes_len: usize,
    /// Severity assigned to new clusters until set externally.
    pub default_severity: u8,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            reopen_delta: defaults::DEFAULT_REOPEN_DELTA,
            urgent_severity: defaults::DEFAULT_URGENT_SEVERITY,
            urgent_confidence: defaults::DEFAULT_URGENT_CONFIDENCE,
            max_notes_len: defaults::DEFAULT_MAX_NOTES_LEN,
            default_severity: defaults::DEFAULT_SEVERITY,
        }
    }
}
