//! # tideguard-storage
//!
//! SQLite persistence layer: one serialized write connection, an optional
//! read pool for file-backed databases, versioned migrations, and query
//! modules per table. Implements [`IHazardStorage`](tideguard_core::traits::IHazardStorage).

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use tideguard_core::errors::{StorageError, TideguardError};

/// Convert a rusqlite (or any stringly) failure into a storage error.
pub(crate) fn to_storage_err(message: String) -> TideguardError {
    TideguardError::StorageError(StorageError::SqliteError { message })
}

/// A row that exists but cannot be decoded back into a model.
pub(crate) fn corrupt_row(table: &str, details: impl Into<String>) -> TideguardError {
    TideguardError::StorageError(StorageError::CorruptRow {
        table: table.to_string(),
        details: details.into(),
    })
}
