use serde::{Deserialize, Serialize};

use super::{ConfidenceTrace, HazardCluster, RawReport, SourceBreakdown, ValidationDecision};

/// Everything a reviewer needs to judge one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterDetail {
    pub cluster: HazardCluster,
    pub member_reports: Vec<RawReport>,
    pub confidence_trace: ConfidenceTrace,
    pub source_breakdown: SourceBreakdown,
    pub priority_score: f64,
    pub urgent_review: bool,
    pub explanation: String,
    pub decisions: Vec<ValidationDecision>,
}
