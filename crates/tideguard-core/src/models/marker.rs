use serde::{Deserialize, Serialize};

use super::{ClusterId, GeoPoint, GridCell, ReportId};

/// What a marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Cluster,
    StandaloneReport,
}

/// Back-reference from a marker to its underlying record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum MarkerRef {
    Cluster(ClusterId),
    Report(ReportId),
}

/// The single visible representative of one grid cell. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedMarker {
    pub position: GeoPoint,
    pub cell: GridCell,
    pub kind: MarkerKind,
    pub priority: i32,
    pub confidence_for_display: f64,
    pub target: MarkerRef,
}
