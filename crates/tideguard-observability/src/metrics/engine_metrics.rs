use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Lock-free counters for every stage of the pipeline.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    reports_ingested: AtomicU64,
    reports_unclassified: AtomicU64,
    reports_attached: AtomicU64,
    clusters_created: AtomicU64,
    fusion_recomputes: AtomicU64,
    decisions_committed: AtomicU64,
    decision_conflicts: AtomicU64,
    reopened: AtomicU64,
    reconcile_passes: AtomicU64,
    reconcile_retries: AtomicU64,
    snapshot_refreshes: AtomicU64,
}

/// Serializable copy of [`EngineMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub reports_ingested: u64,
    pub reports_unclassified: u64,
    pub reports_attached: u64,
    pub clusters_created: u64,
    pub fusion_recomputes: u64,
    pub decisions_committed: u64,
    pub decision_conflicts: u64,
    pub reopened: u64,
    pub reconcile_passes: u64,
    pub reconcile_retries: u64,
    pub snapshot_refreshes: u64,
}

macro_rules! counter {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $method(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )*
    };
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    counter! {
        record_ingested => reports_ingested,
        record_unclassified => reports_unclassified,
        record_attached => reports_attached,
        record_cluster_created => clusters_created,
        record_fusion => fusion_recomputes,
        record_decision => decisions_committed,
        record_conflict => decision_conflicts,
        record_reopened => reopened,
        record_reconcile_pass => reconcile_passes,
        record_retry => reconcile_retries,
        record_snapshot_refresh => snapshot_refreshes,
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            reports_ingested: load(&self.reports_ingested),
            reports_unclassified: load(&self.reports_unclassified),
            reports_attached: load(&self.reports_attached),
            clusters_created: load(&self.clusters_created),
            fusion_recomputes: load(&self.fusion_recomputes),
            decisions_committed: load(&self.decisions_committed),
            decision_conflicts: load(&self.decision_conflicts),
            reopened: load(&self.reopened),
            reconcile_passes: load(&self.reconcile_passes),
            reconcile_retries: load(&self.reconcile_retries),
            snapshot_refreshes: load(&self.snapshot_refreshes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let m = EngineMetrics::new();
        m.record_ingested();
        m.record_ingested();
        m.record_conflict();
        let s = m.snapshot();
        assert_eq!(s.reports_ingested, 2);
        assert_eq!(s.decision_conflicts, 1);
        assert_eq!(s.clusters_created, 0);
    }
}
