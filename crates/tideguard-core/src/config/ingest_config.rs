use serde::{Deserialize, Serialize};

use super::defaults;

/// Ingress boundary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Base confidence substituted when the classifier fails.
    pub unclassified_base_confidence: f64,
    /// Credibility substituted when credibility scoring fails.
    pub fallback_credibility: f64,
    /// Hazard type recorded for unclassified reports.
    pub unknown_hazard_type: String,
    /// Treat beacon (SOS device) reports as emergencies.
    pub beacon_override: bool,
    /// Hazard type assigned to beacon reports when the override is on.
    pub beacon_hazard_type: String,
    /// Base confidence assigned to beacon reports when the override is on.
    pub beacon_base_confidence: f64,
    /// How far in the future `submitted_at` may be before it is rejected.
    pub max_clock_skew_secs: i64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            unclassified_base_confidence: defaults::DEFAULT_UNCLASSIFIED_BASE_CONFIDENCE,
            fallback_credibility: defaults::DEFAULT_FALLBACK_CREDIBILITY,
            unknown_hazard_type: defaults::DEFAULT_UNKNOWN_HAZARD_TYPE.to_string(),
            beacon_override: defaults::DEFAULT_BEACON_OVERRIDE,
            beacon_hazard_type: defaults::DEFAULT_BEACON_HAZARD_TYPE.to_string(),
            beacon_base_confidence: defaults::DEFAULT_BEACON_BASE_CONFIDENCE,
            max_clock_skew_secs: defaults::DEFAULT_MAX_CLOCK_SKEW_SECS,
        }
    }
}
