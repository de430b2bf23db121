//! Structured log events for key pipeline operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log an accepted report.
pub fn report_accepted(report_id: &str, source_type: &str, cell: &str, unclassified: bool) {
    tracing::info!(
        event = "report_accepted",
        report_id = %report_id,
        source_type = %source_type,
        cell = %cell,
        unclassified = unclassified,
        "report accepted"
    );
}

/// Log a report joining an existing cluster.
pub fn report_attached(report_id: &str, cluster_id: &str, member_count: usize) {
    tracing::info!(
        event = "report_attached",
        report_id = %report_id,
        cluster_id = %cluster_id,
        member_count = member_count,
        "report attached"
    );
}

/// Log a new cluster seeded by a report.
pub fn cluster_created(cluster_id: &str, report_id: &str, cell: &str) {
    tracing::info!(
        event = "cluster_created",
        cluster_id = %cluster_id,
        seed_report_id = %report_id,
        cell = %cell,
        "cluster created"
    );
}

/// Log a fused confidence change.
pub fn confidence_updated(cluster_id: &str, previous: f64, current: f64, digest: &str) {
    tracing::debug!(
        event = "confidence_updated",
        cluster_id = %cluster_id,
        previous = previous,
        current = current,
        trace_digest = %digest,
        "cluster confidence updated"
    );
}

/// Log a committed status transition.
pub fn status_changed(cluster_id: &str, from: &str, to: &str, actor: &str) {
    tracing::info!(
        event = "status_changed",
        cluster_id = %cluster_id,
        from = %from,
        to = %to,
        actor = %actor,
        "cluster status changed"
    );
}

/// Log a decision rejected as a conflict.
pub fn decision_conflict(cluster_id: &str, reason: &str) {
    tracing::warn!(
        event = "decision_conflict",
        cluster_id = %cluster_id,
        reason = %reason,
        "decision conflict"
    );
}

/// Log the end of a reconciliation pass.
pub fn reconcile_completed(attached: usize, refused: usize, recomputed: usize, failed: usize) {
    tracing::info!(
        event = "reconcile_completed",
        attached = attached,
        refused = refused,
        recomputed = recomputed,
        failed = failed,
        "reconciliation pass completed"
    );
}

/// Log a marker snapshot refresh.
pub fn snapshot_refreshed(marker_count: usize, candidate_count: usize) {
    tracing::debug!(
        event = "snapshot_refreshed",
        marker_count = marker_count,
        candidate_count = candidate_count,
        "marker snapshot refreshed"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}
