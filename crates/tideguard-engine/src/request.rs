//! Wire-level review request, as review tooling sends it.

use serde::{Deserialize, Serialize};

use tideguard_core::errors::TideguardResult;
use tideguard_core::models::{ClusterId, DecisionAction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub cluster_id: String,
    /// `approve`, `reject`, or `request_more_info`.
    pub action: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub reviewer_id: String,
}

impl DecisionRequest {
    pub fn new(cluster_id: &ClusterId, action: &str, reviewer_id: &str) -> Self {
        Self {
            cluster_id: cluster_id.to_string(),
            action: action.to_string(),
            notes: None,
            reviewer_id: reviewer_id.to_string(),
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Parse the action. A malformed action is a validation error.
    pub fn parsed_action(&self) -> TideguardResult<DecisionAction> {
        self.action.parse()
    }
}
