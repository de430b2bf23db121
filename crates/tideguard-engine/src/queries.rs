//! Read side: markers, cluster listings, review queues, and cluster detail.

use std::sync::Arc;

use chrono::{Duration, Utc};

use tideguard_core::errors::{StorageError, TideguardResult};
use tideguard_core::models::{ClusterDetail, ClusterId, ClusterStatus, HazardCluster, ReportId};
use tideguard_dedup::MarkerCandidates;
use tideguard_fusion::priority;
use tideguard_observability::markers_span;
use tideguard_observability::tracing_setup::events;

use crate::engine::HazardEngine;
use crate::snapshot::{MarkerSnapshot, MarkerView};

impl HazardEngine {
    // --- Markers ---

    /// Current markers, at most `limit` (and never more than the marker cap).
    ///
    /// Served from the snapshot; the view carries `refreshed_at` and the
    /// staleness bound. The first call builds the snapshot synchronously.
    pub fn list_markers(&self, limit: usize) -> TideguardResult<MarkerView> {
        let snapshot = match self.current_snapshot()? {
            Some(snapshot) => snapshot,
            None => self.refresh_markers()?,
        };
        Ok(MarkerView::from_snapshot(
            &snapshot,
            limit,
            self.config.engine.snapshot_refresh_ms,
        ))
    }

    /// Recompute the marker snapshot from storage and publish it.
    pub fn refresh_markers(&self) -> TideguardResult<Arc<MarkerSnapshot>> {
        let now = Utc::now();
        let window = Duration::seconds(self.dedup.config().self_override_window_secs);
        let clusters = self.storage.list_clusters(None)?;
        let seed_ids: Vec<ReportId> = clusters
            .iter()
            .filter(|c| c.member_count() == 1)
            .flat_map(|c| c.member_report_ids.iter().cloned())
            .collect();
        let candidates = MarkerCandidates {
            seed_reports: self.storage.get_reports(&seed_ids)?,
            clusters,
            unattached_reports: self.storage.unattached_reports()?,
            self_submitted_reports: self.storage.self_submitted_since(now - window)?,
        };

        let span = markers_span!(candidates.len());
        let _entered = span.enter();
        let markers = self
            .dedup
            .compute_markers(&candidates, now, self.dedup.config().marker_cap);

        let snapshot = Arc::new(MarkerSnapshot {
            markers,
            refreshed_at: now,
            candidate_count: candidates.len(),
        });
        {
            let mut slot = self
                .snapshot
                .write()
                .map_err(|_| StorageError::LockPoisoned)?;
            *slot = Some(Arc::clone(&snapshot));
        }
        self.observability.metrics.record_snapshot_refresh();
        events::snapshot_refreshed(snapshot.markers.len(), snapshot.candidate_count);
        Ok(snapshot)
    }

    fn current_snapshot(&self) -> TideguardResult<Option<Arc<MarkerSnapshot>>> {
        let slot = self
            .snapshot
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(slot.clone())
    }

    // --- Clusters ---

    pub fn list_clusters(&self, status: Option<ClusterStatus>) -> TideguardResult<Vec<HazardCluster>> {
        self.storage.list_clusters(status)
    }

    /// Clusters in `status`, oldest first.
    pub fn list_by_status(&self, status: ClusterStatus) -> TideguardResult<Vec<HazardCluster>> {
        self.storage.list_clusters(Some(status))
    }

    pub fn list_pending(&self) -> TideguardResult<Vec<HazardCluster>> {
        self.list_by_status(ClusterStatus::Pending)
    }

    pub fn get_cluster(&self, id: &ClusterId) -> TideguardResult<HazardCluster> {
        self.require_cluster(id)
    }

    /// Pending and needs-more-info clusters, highest priority score first.
    pub fn review_queue(&self) -> TideguardResult<Vec<HazardCluster>> {
        let mut queue: Vec<HazardCluster> = self
            .storage
            .list_clusters(None)?
            .into_iter()
            .filter(|c| c.status.in_review_queue())
            .collect();
        queue.sort_by(|a, b| {
            score(b)
                .total_cmp(&score(a))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(queue)
    }

    /// Queued clusters flagged for urgent review, most urgent first.
    pub fn urgent_review_queue(&self) -> TideguardResult<Vec<HazardCluster>> {
        Ok(self.lifecycle.urgent_review_queue(self.review_queue()?))
    }

    /// Everything a reviewer needs for one cluster.
    ///
    /// The trace is replayed from the stored members. If its digest differs
    /// from the stored one, the cluster is marked for recomputation.
    pub fn get_cluster_detail(&self, id: &ClusterId) -> TideguardResult<ClusterDetail> {
        let cluster = self.require_cluster(id)?;
        let members = self.storage.cluster_members(id)?;
        let outcome = self.fusion.fuse(id, &members)?;

        if outcome.trace.digest != cluster.trace_digest {
            tracing::warn!(
                cluster_id = %id,
                stored = %cluster.trace_digest,
                replayed = %outcome.trace.digest,
                "stored trace digest is stale; scheduling recompute"
            );
            self.mark_dirty(id);
        }

        let explanation = priority::explanation(
            members.len(),
            cluster.fused_confidence,
            &cluster.hazard_type,
            cluster.severity,
            cluster.status,
            &self.config.ingest.unknown_hazard_type,
        );
        Ok(ClusterDetail {
            priority_score: score(&cluster),
            urgent_review: self.lifecycle.is_urgent(&cluster),
            explanation,
            decisions: self.storage.decisions_for(id)?,
            confidence_trace: outcome.trace,
            source_breakdown: outcome.source_breakdown,
            member_reports: members,
            cluster,
        })
    }
}

fn score(cluster: &HazardCluster) -> f64 {
    priority::priority_score(&cluster.hazard_type, cluster.fused_confidence, cluster.severity)
}
