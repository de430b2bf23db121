use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClusterId, GeoPoint, GridCell, ReportId};
use crate::errors::TideguardError;

/// Review status of a cluster.
///
/// `Approved` and `Rejected` are terminal. `NeedsMoreInfo` can return to
/// `Pending` once new corroboration arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStatus {
    Pending,
    Approved,
    Rejected,
    NeedsMoreInfo,
}

impl ClusterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClusterStatus::Pending => "pending",
            ClusterStatus::Approved => "approved",
            ClusterStatus::Rejected => "rejected",
            ClusterStatus::NeedsMoreInfo => "needs_more_info",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ClusterStatus::Approved | ClusterStatus::Rejected)
    }

    /// Whether the cluster sits in the validation queue.
    pub fn in_review_queue(self) -> bool {
        matches!(self, ClusterStatus::Pending | ClusterStatus::NeedsMoreInfo)
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterStatus {
    type Err = TideguardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ClusterStatus::Pending),
            "approved" => Ok(ClusterStatus::Approved),
            "rejected" => Ok(ClusterStatus::Rejected),
            "needs_more_info" => Ok(ClusterStatus::NeedsMoreInfo),
            other => Err(TideguardError::validation(format!(
                "unknown cluster status: {other}"
            ))),
        }
    }
}

/// The deduplicated aggregate that reports resolve into. Never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardCluster {
    pub id: ClusterId,
    pub hazard_type: String,
    pub centroid: GeoPoint,
    /// Grid cell of the seed report; the cluster is indexed under it.
    pub cell: GridCell,
    /// 1 (minor) to 5 (critical). Set externally.
    pub severity: u8,
    pub status: ClusterStatus,
    /// In [0, ceiling]. Always derivable from the member reports.
    pub fused_confidence: f64,
    /// Insertion-ordered, duplicate-free.
    pub member_report_ids: Vec<ReportId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Latest `submitted_at` among members.
    pub last_report_at: DateTime<Utc>,
    /// Fused confidence when more information was last requested.
    pub needs_info_baseline: Option<f64>,
    /// Bumped on every committed mutation.
    pub version: u64,
    /// blake3 digest of the current confidence trace.
    pub trace_digest: String,
}

impl HazardCluster {
    pub fn contains(&self, report_id: &ReportId) -> bool {
        self.member_report_ids.iter().any(|id| id == report_id)
    }

    pub fn member_count(&self) -> usize {
        self.member_report_ids.len()
    }
}
