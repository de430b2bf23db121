use serde::{Deserialize, Serialize};

use super::defaults;

/// Spatial deduplication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Decimal places kept when quantizing coordinates to a grid cell.
    pub grid_precision_decimals: u32,
    /// Priority of a marker backed by an existing cluster.
    pub cluster_priority: i32,
    /// Priority of a recent viewer-submitted report shown over its cell's cluster.
    pub self_override_priority: i32,
    /// Priority of an unattached viewer-submitted report.
    pub self_report_priority: i32,
    /// Priority of any other unattached report.
    pub report_priority: i32,
    /// How long a viewer-submitted report may override its cell's cluster marker.
    pub self_override_window_secs: i64,
    /// Hard cap on the number of markers returned by one pass.
    pub marker_cap: usize,
    /// A report joins a cell's cluster only if it is this close in time to
    /// the cluster's latest member.
    pub join_window_secs: i64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            grid_precision_decimals: defaults::DEFAULT_GRID_PRECISION_DECIMALS,
            cluster_priority: defaults::DEFAULT_CLUSTER_PRIORITY,
            self_override_priority: defaults::DEFAULT_SELF_OVERRIDE_PRIORITY,
            self_report_priority: defaults::DEFAULT_SELF_REPORT_PRIORITY,
            report_priority: defaults::DEFAULT_REPORT_PRIORITY,
            self_override_window_secs: defaults::DEFAULT_SELF_OVERRIDE_WINDOW_SECS,
            marker_cap: defaults::DEFAULT_MARKER_CAP,
            join_window_secs: defaults::DEFAULT_JOIN_WINDOW_SECS,
        }
    }
}
