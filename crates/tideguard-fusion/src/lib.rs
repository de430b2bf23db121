//! # tideguard-fusion
//!
//! Replays a cluster's member reports in `submitted_at` order and produces the
//! fused confidence together with a step-by-step [`ConfidenceTrace`]. Also
//! derives the cluster's consensus hazard type, weighted centroid, per-source
//! breakdown, review priority, and a plain-language explanation.
//!
//! [`ConfidenceTrace`]: tideguard_core::models::ConfidenceTrace

pub mod breakdown;
pub mod consensus;
pub mod engine;
pub mod formula;
pub mod priority;

pub use engine::{FusionEngine, FusionOutcome};
