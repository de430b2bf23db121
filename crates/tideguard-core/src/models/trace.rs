use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClusterId, ReportId, SourceType};

/// How one report moved the cluster score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionBreakdown {
    pub source_type: SourceType,
    pub base_confidence: f64,
    pub progressive_boost: f64,
    pub credibility_term: f64,
    pub diversity_factor: f64,
}

/// One step of the replay in `submitted_at` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceStep {
    /// 1-based position in the replay.
    pub step_index: usize,
    pub report_id: ReportId,
    pub timestamp_at_step: DateTime<Utc>,
    pub step_confidence: f64,
    pub distinct_sources: usize,
    /// `step_confidence * diversity_factor`, capped.
    pub raw_confidence: f64,
    /// Running maximum of `raw_confidence`.
    pub cumulative_confidence: f64,
    pub contribution: ContributionBreakdown,
}

/// The full, reproducible explanation of a cluster's fused confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceTrace {
    pub cluster_id: ClusterId,
    pub steps: Vec<ConfidenceStep>,
    /// blake3 hex digest over the serialized steps.
    pub digest: String,
}

impl ConfidenceTrace {
    /// Build a trace and stamp its digest.
    pub fn new(cluster_id: ClusterId, steps: Vec<ConfidenceStep>) -> Self {
        let digest = Self::compute_digest(&steps);
        Self {
            cluster_id,
            steps,
            digest,
        }
    }

    /// Final fused confidence, 0.0 for an empty trace.
    pub fn fused_confidence(&self) -> f64 {
        self.steps
            .last()
            .map(|s| s.cumulative_confidence)
            .unwrap_or(0.0)
    }

    pub fn compute_digest(steps: &[ConfidenceStep]) -> String {
        let bytes = serde_json::to_vec(steps).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }
}

/// Aggregate statistics for one source type inside a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    pub count: usize,
    pub average_base_confidence: f64,
    pub average_credibility: f64,
}

/// Per-source statistics, ordered by source type.
pub type SourceBreakdown = BTreeMap<SourceType, SourceStats>;
