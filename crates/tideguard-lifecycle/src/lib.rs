//! # tideguard-lifecycle
//!
//! Review workflow for hazard clusters. The state machine lives in
//! [`transitions`]; [`LifecycleManager`] turns a reviewer's request into the
//! next cluster state plus its audit record, ready for a versioned commit.

pub mod manager;
pub mod transitions;
pub mod urgency;
pub mod validation;

pub use manager::{DecisionPlan, LifecycleManager};
