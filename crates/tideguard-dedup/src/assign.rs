//! Cluster assignment for a newly ingested report.

use chrono::Duration;
use tideguard_core::config::DedupConfig;
use tideguard_core::models::{ClusterId, ClusterStatus, GridCell, HazardCluster, RawReport};

/// Where a report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// Join an existing cluster.
    Join(ClusterId),
    /// No eligible cluster: the report seeds a new one in this cell.
    Seed(GridCell),
}

/// Whether `cluster` may absorb `report`.
///
/// Same cell, not rejected, and `last_report_at` within the join window of the
/// report's `submitted_at` in either direction.
pub fn is_eligible(
    cluster: &HazardCluster,
    report: &RawReport,
    cell: GridCell,
    config: &DedupConfig,
) -> bool {
    if cluster.cell != cell || cluster.status == ClusterStatus::Rejected {
        return false;
    }
    let gap = (cluster.last_report_at - report.submitted_at).abs();
    gap <= Duration::seconds(config.join_window_secs)
}

/// Pick the cluster a report joins among `candidates`.
///
/// Prefers the latest `last_report_at`, then the lower id, so the choice does
/// not depend on the order `candidates` were loaded in.
pub fn choose_cluster(
    report: &RawReport,
    candidates: &[HazardCluster],
    config: &DedupConfig,
) -> Assignment {
    let cell = GridCell::from_point(report.position, config.grid_precision_decimals);
    candidates
        .iter()
        .filter(|c| is_eligible(c, report, cell, config))
        .max_by(|a, b| {
            a.last_report_at
                .cmp(&b.last_report_at)
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|c| Assignment::Join(c.id.clone()))
        .unwrap_or(Assignment::Seed(cell))
}
