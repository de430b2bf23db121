//! # tideguard-dedup
//!
//! Spatial deduplication over a fixed-precision lat/lon grid.
//!
//! Two pure operations: [`assign::choose_cluster`] decides which cluster a new
//! report joins, and [`markers::compute_markers`] collapses clusters and
//! reports into at most one [`UnifiedMarker`](tideguard_core::models::UnifiedMarker)
//! per grid cell. Both are deterministic in the multiset of their inputs.

pub mod assign;
pub mod deduplicator;
pub mod markers;

pub use assign::Assignment;
pub use deduplicator::Deduplicator;
pub use markers::MarkerCandidates;
