use std::cmp::Ordering;

use tideguard_core::config::LifecycleConfig;
use tideguard_core::models::HazardCluster;

/// A queued cluster needs urgent review when it is severe or already well corroborated.
pub fn is_urgent(cluster: &HazardCluster, config: &LifecycleConfig) -> bool {
    cluster.status.in_review_queue()
        && (cluster.severity >= config.urgent_severity
            || cluster.fused_confidence >= config.urgent_confidence)
}

/// Most urgent first: severity, then confidence, then the most recent activity, then id.
pub fn urgency_order(a: &HazardCluster, b: &HazardCluster) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| b.fused_confidence.total_cmp(&a.fused_confidence))
        .then_with(|| b.last_report_at.cmp(&a.last_report_at))
        .then_with(|| a.id.cmp(&b.id))
}
