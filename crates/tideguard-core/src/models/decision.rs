use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClusterId, ClusterStatus};
use crate::errors::TideguardError;

/// A reviewer's verdict on a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Approve,
    Reject,
    RequestMoreInfo,
}

impl DecisionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionAction::Approve => "approve",
            DecisionAction::Reject => "reject",
            DecisionAction::RequestMoreInfo => "request_more_info",
        }
    }

    /// Status the cluster lands in when this action succeeds.
    pub fn target_status(self) -> ClusterStatus {
        match self {
            DecisionAction::Approve => ClusterStatus::Approved,
            DecisionAction::Reject => ClusterStatus::Rejected,
            DecisionAction::RequestMoreInfo => ClusterStatus::NeedsMoreInfo,
        }
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionAction {
    type Err = TideguardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(DecisionAction::Approve),
            "reject" => Ok(DecisionAction::Reject),
            "request_more_info" => Ok(DecisionAction::RequestMoreInfo),
            other => Err(TideguardError::validation(format!(
                "malformed action: {other:?} (expected approve, reject, or request_more_info)"
            ))),
        }
    }
}

/// Immutable audit record of one successful transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationDecision {
    pub id: String,
    pub cluster_id: ClusterId,
    pub action: DecisionAction,
    pub notes: Option<String>,
    pub reviewer_id: String,
    pub decided_at: DateTime<Utc>,
    pub from_status: ClusterStatus,
    pub to_status: ClusterStatus,
    pub fused_confidence_at_decision: f64,
}

/// Result of `record_decision` as seen by review tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DecisionOutcome {
    Success { decision: ValidationDecision },
    Conflict { reason: String },
    NotFound { cluster_id: String },
}
