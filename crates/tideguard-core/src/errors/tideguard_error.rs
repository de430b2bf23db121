use super::{ConflictError, FusionError, StorageError};

/// Top-level error for every fallible Tideguard operation.
///
/// The boundary taxonomy is validation / conflict / not-found; everything else
/// is an internal failure the caller cannot fix by changing its input.
#[derive(Debug, thiserror::Error)]
pub enum TideguardError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    #[error("cluster not found: {id}")]
    ClusterNotFound { id: String },

    #[error("report not found: {id}")]
    ReportNotFound { id: String },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("fusion error: {0}")]
    FusionError(#[from] FusionError),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("degraded mode: {component} using fallback {fallback}")]
    DegradedMode { component: String, fallback: String },

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),
}

impl TideguardError {
    /// Shorthand for building a validation error from anything displayable.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationError(reason.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ClusterNotFound { .. } | Self::ReportNotFound { .. })
    }

    /// Transient failures are the only ones background work may retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StorageError(StorageError::SqliteError { .. })
                | Self::StorageError(StorageError::LockPoisoned)
                | Self::Conflict(ConflictError::LostRace { .. })
                | Self::ConcurrencyError(_)
        )
    }
}
