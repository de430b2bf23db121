use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tideguard_core::config::FusionConfig;
use tideguard_core::errors::{FusionError, TideguardResult};
use tideguard_core::models::{
    ClusterId, ConfidenceTrace, GeoPoint, HazardCluster, RawReport, ReportId, SourceBreakdown,
};

use crate::{breakdown, consensus, formula};

/// Everything fusion derives from a member set.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    pub trace: ConfidenceTrace,
    pub fused_confidence: f64,
    pub source_breakdown: SourceBreakdown,
    pub hazard_type: String,
    pub centroid: GeoPoint,
    /// Latest `submitted_at` among members.
    pub last_report_at: DateTime<Utc>,
}

/// Confidence fusion engine. Stateless apart from its configuration, so one
/// instance can be shared across threads.
///
/// Every call replays the full member set in `submitted_at` order. The fused
/// value only grows while reports arrive in that order. A late report with an
/// earlier `submitted_at` is replayed ahead of the others and can lower the
/// result: an official report alone fuses to about 0.79, but adding a citizen
/// report submitted before it gives 0.534.
#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Replay trace only. Pure: the same members always give the same trace and digest.
    pub fn trace(&self, cluster_id: &ClusterId, members: &[RawReport]) -> ConfidenceTrace {
        formula::compute_trace(cluster_id, members, &self.config)
    }

    /// Full fusion of a non-empty member set.
    pub fn fuse(&self, cluster_id: &ClusterId, members: &[RawReport]) -> TideguardResult<FusionOutcome> {
        let empty = || FusionError::EmptyCluster {
            cluster_id: cluster_id.to_string(),
        };
        let last_report_at = members
            .iter()
            .map(|r| r.submitted_at)
            .max()
            .ok_or_else(empty)?;
        let weights = &self.config.source_weights;
        let hazard_type = consensus::consensus_hazard_type(members, weights).ok_or_else(empty)?;
        let centroid = consensus::weighted_centroid(members, weights).ok_or_else(empty)?;

        let trace = self.trace(cluster_id, members);
        let fused_confidence = trace.fused_confidence();

        tracing::debug!(
            cluster_id = %cluster_id,
            members = members.len(),
            fused_confidence,
            digest = %trace.digest,
            "cluster fused"
        );

        Ok(FusionOutcome {
            fused_confidence,
            source_breakdown: breakdown::source_breakdown(members),
            hazard_type,
            centroid,
            last_report_at,
            trace,
        })
    }

    /// Recompute `cluster`'s derived fields from `members`.
    ///
    /// `members` must contain every id in `cluster.member_report_ids`. Version
    /// and timestamps are left to the caller that commits the change.
    pub fn apply(
        &self,
        cluster: &mut HazardCluster,
        members: &[RawReport],
    ) -> TideguardResult<FusionOutcome> {
        let present: HashSet<&ReportId> = members.iter().map(|r| &r.id).collect();
        if let Some(missing) = cluster.member_report_ids.iter().find(|id| !present.contains(id)) {
            return Err(FusionError::MissingMember {
                cluster_id: cluster.id.to_string(),
                report_id: missing.to_string(),
            }
            .into());
        }

        let outcome = self.fuse(&cluster.id, members)?;
        cluster.fused_confidence = outcome.fused_confidence;
        cluster.trace_digest = outcome.trace.digest.clone();
        cluster.hazard_type = outcome.hazard_type.clone();
        cluster.centroid = outcome.centroid;
        cluster.last_report_at = outcome.last_report_at;
        Ok(outcome)
    }
}
