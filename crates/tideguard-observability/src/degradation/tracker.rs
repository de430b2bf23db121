//! Record every degradation: component, failure mode, fallback used, timestamp, recovery status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tideguard_core::models::DegradationEvent;

/// Recovery status of a degradation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// Still in degraded mode.
    Active,
    /// Recovered to normal operation.
    Recovered,
}

/// A tracked degradation event with recovery status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedDegradation {
    pub event: DegradationEvent,
    pub recovery_status: RecoveryStatus,
    pub recovered_at: Option<DateTime<Utc>>,
}

/// Tracks degradation events (classifier fallbacks, exhausted retries) for alerting.
#[derive(Debug, Clone, Default)]
pub struct DegradationTracker {
    events: Vec<TrackedDegradation>,
}

/// Oldest events are dropped beyond this many.
const MAX_TRACKED: usize = 10_000;

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new degradation event.
    pub fn record(&mut self, event: DegradationEvent) {
        crate::tracing_setup::events::degradation_triggered(
            &event.component,
            &event.failure,
            &event.fallback_used,
        );
        self.events.push(TrackedDegradation {
            event,
            recovery_status: RecoveryStatus::Active,
            recovered_at: None,
        });
        if self.events.len() > MAX_TRACKED {
            self.events.drain(..self.events.len() - MAX_TRACKED);
        }
    }

    /// Mark every active degradation of a component as recovered.
    pub fn mark_recovered(&mut self, component: &str) {
        let now = Utc::now();
        for tracked in self.events.iter_mut() {
            if tracked.event.component == component
                && tracked.recovery_status == RecoveryStatus::Active
            {
                tracked.recovery_status = RecoveryStatus::Recovered;
                tracked.recovered_at = Some(now);
            }
        }
    }

    pub fn events(&self) -> &[TrackedDegradation] {
        &self.events
    }

    /// Get active (unrecovered) degradations.
    pub fn active_degradations(&self) -> Vec<&TrackedDegradation> {
        self.events
            .iter()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
            .collect()
    }

    /// How long `component` has been degraded as of `now`, or None if it is not.
    pub fn degraded_duration(&self, component: &str, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let earliest = self
            .events
            .iter()
            .filter(|t| {
                t.event.component == component && t.recovery_status == RecoveryStatus::Active
            })
            .map(|t| t.event.timestamp)
            .min()?;
        Some(now - earliest)
    }
}
