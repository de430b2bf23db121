//! [`ObservabilityEngine`] owns metrics and degradation tracking for one engine instance.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tideguard_core::config::ObservabilityConfig;
use tideguard_core::errors::TideguardResult;
use tideguard_core::models::DegradationEvent;

use crate::degradation::{evaluate_alerts, AlertThresholds, DegradationAlert, DegradationTracker};
use crate::metrics::{EngineMetrics, MetricsSnapshot};

/// Shared observability state. All methods take `&self`.
///
/// The tracker lock is recovered if poisoned: a panic elsewhere must not
/// silence degradation records.
#[derive(Debug, Default)]
pub struct ObservabilityEngine {
    pub metrics: EngineMetrics,
    degradation: Mutex<DegradationTracker>,
    thresholds: AlertThresholds,
}

impl ObservabilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ObservabilityConfig) -> Self {
        Self {
            thresholds: AlertThresholds::from_config(config),
            ..Self::default()
        }
    }

    fn tracker(&self) -> MutexGuard<'_, DegradationTracker> {
        self.degradation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a degradation: a component fell back to a lower-quality mode.
    pub fn record_degradation(&self, component: &str, failure: &str, fallback: &str) {
        self.tracker().record(DegradationEvent {
            component: component.to_string(),
            failure: failure.to_string(),
            fallback_used: fallback.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn mark_recovered(&self, component: &str) {
        self.tracker().mark_recovered(component);
    }

    /// Number of degradations not yet marked recovered.
    pub fn active_degradations(&self) -> usize {
        self.tracker().active_degradations().len()
    }

    pub fn degradation_alerts(&self) -> Vec<DegradationAlert> {
        evaluate_alerts(&self.tracker(), &self.thresholds, Utc::now())
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Serialize metrics, degradation state, and alerts to JSON.
    pub fn report(&self) -> TideguardResult<serde_json::Value> {
        let metrics = serde_json::to_value(self.metrics.snapshot())?;
        let tracker = self.tracker();
        let alerts = serde_json::to_value(evaluate_alerts(&tracker, &self.thresholds, Utc::now()))?;
        Ok(serde_json::json!({
            "metrics": metrics,
            "active_degradations": tracker.active_degradations().len(),
            "alerts": alerts,
        }))
    }
}
