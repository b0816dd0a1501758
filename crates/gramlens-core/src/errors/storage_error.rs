//! Storage errors.

use super::error_code::{self, ErrorCode};

/// Errors raised by the corpus store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing database cannot be opened or read at all.
    #[error("corpus store unreachable: {message}")]
    Unreachable { message: String },

    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    /// A running statement was stopped by the interrupt guard.
    #[error("query interrupted")]
    Interrupted,
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => error_code::STORAGE_UNREACHABLE,
            Self::SqliteError { .. } => error_code::STORAGE_ERROR,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::Interrupted => error_code::INTERRUPTED,
        }
    }
}
