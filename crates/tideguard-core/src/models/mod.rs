mod cluster;
mod decision;
mod degradation_event;
mod detail;
mod event;
mod geo;
mod ids;
mod marker;
mod report;
mod trace;

pub use cluster::{ClusterStatus, HazardCluster};
pub use decision::{DecisionAction, DecisionOutcome, ValidationDecision};
pub use degradation_event::DegradationEvent;
pub use detail::ClusterDetail;
pub use event::{HazardEvent, HazardEventKind};
pub use geo::{GeoPoint, GridCell};
pub use ids::{ClusterId, ReportId};
pub use marker::{MarkerKind, MarkerRef, UnifiedMarker};
pub use report::{RawReport, ReportSubmission, SourceType};
pub use trace::{
    ConfidenceStep, ConfidenceTrace, ContributionBreakdown, SourceBreakdown, SourceStats,
};
