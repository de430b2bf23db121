use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::errors::TideguardResult;
use crate::models::{
    ClusterId, ClusterStatus, GridCell, HazardCluster, HazardEvent, RawReport, ReportId,
    ValidationDecision,
};

/// Persisted store keyed by cluster: reports, clusters, membership, decisions, events.
///
/// Every mutation of an existing cluster is a compare-and-set on its
/// `version`; a mismatch fails with `ConflictError::LostRace` and leaves the
/// stored row untouched.
pub trait IHazardStorage: Send + Sync {
    // --- Reports ---
    fn insert_report(&self, report: &RawReport) -> TideguardResult<()>;
    fn get_report(&self, id: &ReportId) -> TideguardResult<Option<RawReport>>;
    fn get_reports(&self, ids: &[ReportId]) -> TideguardResult<Vec<RawReport>>;
    /// Reports that have not been attached to any cluster yet.
    fn unattached_reports(&self) -> TideguardResult<Vec<RawReport>>;
    /// Viewer-submitted reports with `submitted_at >= since`.
    fn self_submitted_since(&self, since: DateTime<Utc>) -> TideguardResult<Vec<RawReport>>;
    fn cluster_of_report(&self, id: &ReportId) -> TideguardResult<Option<ClusterId>>;

    // --- Clusters ---
    /// Insert a new cluster together with its membership rows.
    fn create_cluster(&self, cluster: &HazardCluster) -> TideguardResult<()>;
    /// Persist a mutated cluster (fusion fields, status, severity, new members).
    fn commit_cluster(&self, cluster: &HazardCluster, expected_version: u64)
        -> TideguardResult<()>;
    fn get_cluster(&self, id: &ClusterId) -> TideguardResult<Option<HazardCluster>>;
    fn clusters_in_cell(&self, cell: &GridCell) -> TideguardResult<Vec<HazardCluster>>;
    fn list_clusters(&self, status: Option<ClusterStatus>) -> TideguardResult<Vec<HazardCluster>>;
    fn cluster_members(&self, id: &ClusterId) -> TideguardResult<Vec<RawReport>>;

    // --- Decisions ---
    /// Persist a status transition and its audit record atomically.
    fn commit_decision(
        &self,
        cluster: &HazardCluster,
        expected_version: u64,
        decision: &ValidationDecision,
    ) -> TideguardResult<()>;
    fn decisions_for(&self, id: &ClusterId) -> TideguardResult<Vec<ValidationDecision>>;

    // --- Events ---
    /// Append to the durable event log, returning the assigned sequence.
    fn append_event(&self, event: &HazardEvent) -> TideguardResult<u64>;
    fn events_since(&self, after_sequence: u64, limit: usize) -> TideguardResult<Vec<HazardEvent>>;
}

/// Blanket impl: `Arc<T>` implements `IHazardStorage` by delegating to the inner `T`.
impl<T: IHazardStorage> IHazardStorage for Arc<T> {
    fn insert_report(&self, report: &RawReport) -> TideguardResult<()> { (**self).insert_report(report) }
    fn get_report(&self, id: &ReportId) -> TideguardResult<Option<RawReport>> { (**self).get_report(id) }
    fn get_reports(&self, ids: &[ReportId]) -> TideguardResult<Vec<RawReport>> { (**self).get_reports(ids) }
    fn unattached_reports(&self) -> TideguardResult<Vec<RawReport>> { (**self).unattached_reports() }
    fn self_submitted_since(&self, since: DateTime<Utc>) -> TideguardResult<Vec<RawReport>> { (**self).self_submitted_since(since) }
    fn cluster_of_report(&self, id: &ReportId) -> TideguardResult<Option<ClusterId>> { (**self).cluster_of_report(id) }
    fn create_cluster(&self, cluster: &HazardCluster) -> TideguardResult<()> { (**self).create_cluster(cluster) }
    fn commit_cluster(&self, cluster: &HazardCluster, expected_version: u64) -> TideguardResult<()> { (**self).commit_cluster(cluster, expected_version) }
    fn get_cluster(&self, id: &ClusterId) -> TideguardResult<Option<HazardCluster>> { (**self).get_cluster(id) }
    fn clusters_in_cell(&self, cell: &GridCell) -> TideguardResult<Vec<HazardCluster>> { (**self).clusters_in_cell(cell) }
    fn list_clusters(&self, status: Option<ClusterStatus>) -> TideguardResult<Vec<HazardCluster>> { (**self).list_clusters(status) }
    fn cluster_members(&self, id: &ClusterId) -> TideguardResult<Vec<RawReport>> { (**self).cluster_members(id) }
    fn commit_decision(&self, cluster: &HazardCluster, expected_version: u64, decision: &ValidationDecision) -> TideguardResult<()> { (**self).commit_decision(cluster, expected_version, decision) }
    fn decisions_for(&self, id: &ClusterId) -> TideguardResult<Vec<ValidationDecision>> { (**self).decisions_for(id) }
    fn append_event(&self, event: &HazardEvent) -> TideguardResult<u64> { (**self).append_event(event) }
    fn events_since(&self, after_sequence: u64, limit: usize) -> TideguardResult<Vec<HazardEvent>> { (**self).events_since(after_sequence, limit) }
}
