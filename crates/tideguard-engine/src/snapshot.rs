//! Read-mostly marker snapshot served to map clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tideguard_core::models::UnifiedMarker;

/// One marker pass, computed at `refreshed_at` with the full marker cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSnapshot {
    pub markers: Vec<UnifiedMarker>,
    pub refreshed_at: DateTime<Utc>,
    /// Clusters and reports the pass looked at.
    pub candidate_count: usize,
}

/// What `list_markers` returns: the markers plus how stale they may be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerView {
    pub markers: Vec<UnifiedMarker>,
    pub refreshed_at: DateTime<Utc>,
    /// Upper bound on staleness while the background refresh is running.
    pub staleness_bound_ms: u64,
}

impl MarkerView {
    /// Prefix of `snapshot`. Markers are sorted by priority, so a prefix is
    /// exactly what a pass with the smaller limit would produce.
    pub fn from_snapshot(snapshot: &MarkerSnapshot, limit: usize, staleness_bound_ms: u64) -> Self {
        Self {
            markers: snapshot.markers.iter().take(limit).cloned().collect(),
            refreshed_at: snapshot.refreshed_at,
            staleness_bound_ms,
        }
    }
}
