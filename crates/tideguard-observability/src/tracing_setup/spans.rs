//! Span definitions per operation: ingest, assignment, fusion, decision, markers, reconcile.

/// Create an ingest span.
#[macro_export]
macro_rules! ingest_span {
    ($source_type:expr) => {
        tracing::info_span!("tideguard.ingest", source_type = %$source_type)
    };
}

/// Create an assignment span.
#[macro_export]
macro_rules! assignment_span {
    ($report_id:expr, $cell:expr) => {
        tracing::info_span!("tideguard.assignment", report_id = %$report_id, cell = %$cell)
    };
}

/// Create a fusion span.
#[macro_export]
macro_rules! fusion_span {
    ($cluster_id:expr, $member_count:expr) => {
        tracing::debug_span!(
            "tideguard.fusion",
            cluster_id = %$cluster_id,
            member_count = $member_count
        )
    };
}

/// Create a decision span.
#[macro_export]
macro_rules! decision_span {
    ($cluster_id:expr, $action:expr) => {
        tracing::info_span!("tideguard.decision", cluster_id = %$cluster_id, action = %$action)
    };
}

/// Create a marker computation span.
#[macro_export]
macro_rules! markers_span {
    ($candidate_count:expr) => {
        tracing::debug_span!("tideguard.markers", candidate_count = $candidate_count)
    };
}

/// Create a reconciliation pass span.
#[macro_export]
macro_rules! reconcile_span {
    ($pass:expr) => {
        tracing::info_span!("tideguard.reconcile", pass = $pass)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const INGEST: &str = "tideguard.ingest";
    pub const ASSIGNMENT: &str = "tideguard.assignment";
    pub const FUSION: &str = "tideguard.fusion";
    pub const DECISION: &str = "tideguard.decision";
    pub const MARKERS: &str = "tideguard.markers";
    pub const RECONCILE: &str = "tideguard.reconcile";
}
