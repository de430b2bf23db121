//! # tideguard-engine
//!
//! [`HazardEngine`] wires the pipeline together: report ingress, grid
//! assignment under per-cell and per-cluster locks, confidence fusion, the
//! review state machine, and versioned commits to storage. Every committed
//! change is appended to the durable event log and broadcast to live
//! subscribers.
//!
//! [`reconciler::spawn_background`] runs the periodic work on tokio: marker
//! snapshot refresh, retry of unattached reports and stale clusters, and
//! keepalives.

pub mod backoff;
pub mod engine;
pub mod events;
pub mod locks;
pub mod queries;
pub mod reconciler;
pub mod request;
pub mod review;
pub mod snapshot;

pub use engine::HazardEngine;
pub use events::{EventApplier, EventBus};
pub use reconciler::{spawn_background, BackgroundHandle, ReconcileReport};
pub use request::DecisionRequest;
pub use snapshot::{MarkerSnapshot, MarkerView};
