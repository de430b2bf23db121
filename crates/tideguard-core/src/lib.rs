//! # tideguard-core
//!
//! Foundation crate for the Tideguard hazard fusion engine.
//! Defines the data model, traits, errors, and configuration.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::TideguardConfig;
pub use errors::{TideguardError, TideguardResult};
pub use models::{
    ClusterId, ClusterStatus, GeoPoint, GridCell, HazardCluster, RawReport, ReportId, SourceType,
};
