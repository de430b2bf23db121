//! # tideguard-observability
//!
//! Structured tracing with span definitions, pipeline metrics (ingest, assignment,
//! fusion, review, reconciliation), and degradation event tracking with alerting.

pub mod degradation;
pub mod engine;
pub mod metrics;
pub mod tracing_setup;

pub use engine::ObservabilityEngine;
pub use metrics::{EngineMetrics, MetricsSnapshot};
