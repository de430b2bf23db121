use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A subsystem fell back to a lower-quality mode (e.g. classifier defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}
