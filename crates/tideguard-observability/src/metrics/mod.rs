//! Pipeline counters.
//!
//! [`EngineMetrics`] is shared across request and background threads, so every
//! counter is an atomic. [`MetricsSnapshot`] is the serializable point-in-time view.

mod engine_metrics;

pub use engine_metrics::{EngineMetrics, MetricsSnapshot};
