use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TideguardError;

/// Kinds of change events produced toward notification fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardEventKind {
    NewReport,
    ReportAttached,
    ClusterCreated,
    ClusterConfidenceUpdated,
    ClusterStatusChanged,
    Keepalive,
}

impl HazardEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HazardEventKind::NewReport => "new_report",
            HazardEventKind::ReportAttached => "report_attached",
            HazardEventKind::ClusterCreated => "cluster_created",
            HazardEventKind::ClusterConfidenceUpdated => "cluster_confidence_updated",
            HazardEventKind::ClusterStatusChanged => "cluster_status_changed",
            HazardEventKind::Keepalive => "keepalive",
        }
    }
}

impl fmt::Display for HazardEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardEventKind {
    type Err = TideguardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_report" => Ok(HazardEventKind::NewReport),
            "report_attached" => Ok(HazardEventKind::ReportAttached),
            "cluster_created" => Ok(HazardEventKind::ClusterCreated),
            "cluster_confidence_updated" => Ok(HazardEventKind::ClusterConfidenceUpdated),
            "cluster_status_changed" => Ok(HazardEventKind::ClusterStatusChanged),
            "keepalive" => Ok(HazardEventKind::Keepalive),
            other => Err(TideguardError::validation(format!(
                "unknown event kind: {other}"
            ))),
        }
    }
}

/// A change notification. Delivery is at-least-once; consumers apply it
/// idempotently by `(event_id, version)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardEvent {
    /// Position in the durable event log, assigned on append.
    #[serde(default)]
    pub sequence: Option<u64>,
    pub event_id: String,
    pub kind: HazardEventKind,
    /// Cluster or report id the event is about. Empty for keepalives.
    pub subject_id: String,
    /// Version of the subject after the change.
    pub version: u64,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl HazardEvent {
    pub fn new(
        kind: HazardEventKind,
        subject_id: impl Into<String>,
        version: u64,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            sequence: None,
            event_id: uuid::Uuid::new_v4().to_string(),
            kind,
            subject_id: subject_id.into(),
            version,
            occurred_at: Utc::now(),
            payload,
        }
    }

    pub fn keepalive() -> Self {
        Self::new(HazardEventKind::Keepalive, "", 0, serde_json::Value::Null)
    }
}
