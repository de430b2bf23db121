//! Alerts for the scoring components that fall back at ingest.
//!
//! A component that keeps failing inside the alert window is a warning:
//! reports are still accepted but scored with defaults. A component that has
//! not recovered for the critical duration is critical: every report since
//! then is unclassified or carries fallback credibility.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tideguard_core::config::ObservabilityConfig;

use super::tracker::DegradationTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

/// Thresholds read from [`ObservabilityConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    pub window: Duration,
    pub warning_fallbacks: usize,
    pub critical_after: Duration,
}

impl AlertThresholds {
    pub fn from_config(config: &ObservabilityConfig) -> Self {
        Self {
            window: Duration::seconds(config.alert_window_secs),
            warning_fallbacks: config.alert_warning_fallbacks,
            critical_after: Duration::seconds(config.alert_critical_secs),
        }
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self::from_config(&ObservabilityConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationAlert {
    pub level: AlertLevel,
    pub component: String,
    /// Fallback applied by the most recent degradation.
    pub fallback_used: String,
    pub fallbacks_in_window: usize,
    /// Seconds since the oldest unrecovered degradation, if any.
    pub degraded_for_secs: Option<i64>,
    pub message: String,
}

/// One alert per component at most, ordered by component name.
pub fn evaluate_alerts(
    tracker: &DegradationTracker,
    thresholds: &AlertThresholds,
    now: DateTime<Utc>,
) -> Vec<DegradationAlert> {
    let components: BTreeSet<&str> = tracker
        .events()
        .iter()
        .map(|t| t.event.component.as_str())
        .collect();

    let window_start = now - thresholds.window;
    let mut alerts = Vec::new();
    for component in components {
        let events: Vec<_> = tracker
            .events()
            .iter()
            .filter(|t| t.event.component == component)
            .collect();
        let fallbacks_in_window = events
            .iter()
            .filter(|t| t.event.timestamp > window_start)
            .count();
        let degraded_for = tracker.degraded_duration(component, now);
        let fallback_used = events
            .last()
            .map(|t| t.event.fallback_used.clone())
            .unwrap_or_default();

        let (level, message) = match degraded_for {
            Some(d) if d >= thresholds.critical_after => (
                AlertLevel::Critical,
                format!(
                    "{component} degraded for {} min; reports scored with {fallback_used}",
                    d.num_minutes()
                ),
            ),
            _ if fallbacks_in_window > thresholds.warning_fallbacks => (
                AlertLevel::Warning,
                format!(
                    "{component} fell back {fallbacks_in_window} times in {} min",
                    thresholds.window.num_minutes()
                ),
            ),
            _ => continue,
        };
        alerts.push(DegradationAlert {
            level,
            component: component.to_string(),
            fallback_used,
            fallbacks_in_window,
            degraded_for_secs: degraded_for.map(|d| d.num_seconds()),
            message,
        });
    }
    alerts
}
