mod conflict_error;
mod fusion_error;
mod storage_error;
mod tideguard_error;

pub use conflict_error::ConflictError;
pub use fusion_error::FusionError;
pub use storage_error::StorageError;
pub use tideguard_error::TideguardError;

/// Convenience alias used across every crate in the workspace.
pub type TideguardResult<T> = Result<T, TideguardError>;
