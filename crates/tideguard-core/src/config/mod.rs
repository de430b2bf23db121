//! Configuration for every subsystem, loadable from TOML.
//!
//! # Examples
//!
//! ```
//! use tideguard_core::config::TideguardConfig;
//!
//! let config = TideguardConfig::from_toml("[dedup]\nmarker_cap = 20\n").unwrap();
//! assert_eq!(config.dedup.marker_cap, 20);
//! assert_eq!(config.dedup.grid_precision_decimals, 3);
//! ```

pub mod defaults;
mod dedup_config;
mod engine_config;
mod fusion_config;
mod ingest_config;
mod lifecycle_config;
mod observability_config;
mod storage_config;

pub use dedup_config::DedupConfig;
pub use engine_config::EngineConfig;
pub use fusion_config::{FusionConfig, SourceWeights};
pub use ingest_config::IngestConfig;
pub use lifecycle_config::LifecycleConfig;
pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{TideguardError, TideguardResult};

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TideguardConfig {
    pub dedup: DedupConfig,
    pub fusion: FusionConfig,
    pub lifecycle: LifecycleConfig,
    pub ingest: IngestConfig,
    pub storage: StorageConfig,
    pub engine: EngineConfig,
    pub observability: ObservabilityConfig,
}

impl TideguardConfig {
    /// Parse a TOML document and validate the result.
    pub fn from_toml(toml_str: &str) -> TideguardResult<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| TideguardError::ConfigError(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the engine's invariants.
    pub fn validate(&self) -> TideguardResult<()> {
        let err = |msg: String| Err(TideguardError::ConfigError(msg));

        if self.dedup.grid_precision_decimals > 7 {
            return err(format!(
                "dedup.grid_precision_decimals must be <= 7, got {}",
                self.dedup.grid_precision_decimals
            ));
        }
        if self.dedup.marker_cap == 0 {
            return err("dedup.marker_cap must be > 0".to_string());
        }
        if self.dedup.self_override_window_secs < 0 || self.dedup.join_window_secs < 0 {
            return err("dedup windows must be non-negative".to_string());
        }

        let f = &self.fusion;
        if !(f.confidence_ceiling > 0.0 && f.confidence_ceiling <= 1.0) {
            return err(format!(
                "fusion.confidence_ceiling must be in (0, 1], got {}",
                f.confidence_ceiling
            ));
        }
        for (name, value) in [
            ("fusion.boost_step", f.boost_step),
            ("fusion.boost_cap", f.boost_cap),
            ("fusion.credibility_weight", f.credibility_weight),
            ("fusion.diversity_step", f.diversity_step),
            ("fusion.diversity_cap", f.diversity_cap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return err(format!("{name} must be a non-negative number, got {value}"));
            }
        }

        let l = &self.lifecycle;
        if !(1..=5).contains(&l.default_severity) || !(1..=5).contains(&l.urgent_severity) {
            return err("lifecycle severities must be within 1..=5".to_string());
        }
        if !(0.0..=1.0).contains(&l.reopen_delta) {
            return err(format!(
                "lifecycle.reopen_delta must be in [0, 1], got {}",
                l.reopen_delta
            ));
        }

        let i = &self.ingest;
        for (name, value) in [
            ("ingest.unclassified_base_confidence", i.unclassified_base_confidence),
            ("ingest.fallback_credibility", i.fallback_credibility),
            ("ingest.beacon_base_confidence", i.beacon_base_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return err(format!("{name} must be in [0, 1], got {value}"));
            }
        }

        let e = &self.engine;
        if e.event_channel_capacity == 0 {
            return err("engine.event_channel_capacity must be > 0".to_string());
        }
        if e.snapshot_refresh_ms == 0 || e.keepalive_interval_secs == 0 {
            return err("engine refresh and keepalive intervals must be > 0".to_string());
        }
        if e.reconcile_max_attempts == 0 {
            return err("engine.reconcile_max_attempts must be > 0".to_string());
        }

        let o = &self.observability;
        if o.alert_window_secs <= 0 || o.alert_critical_secs <= 0 {
            return err("observability alert windows must be > 0".to_string());
        }

        Ok(())
    }
}
