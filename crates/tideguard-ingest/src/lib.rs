//! # tideguard-ingest
//!
//! The boundary every report crosses before it reaches the engine. Rejects
//! malformed submissions, fills missing scores from the external classifier
//! and the [`CredibilityScorer`], and falls back to conservative defaults
//! (flagging the report `unclassified`) when either one fails.

pub mod credibility;
pub mod ingress;

pub use credibility::{CredibilityAssessment, CredibilityScorer};
pub use ingress::{IngestedReport, ReportIngress};
