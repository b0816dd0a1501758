//! # gramlens-storage
//!
//! SQLite persistence for the gramlens corpus: one serialized writer plus a
//! round-robin read pool, versioned migrations, the predicate → SQL renderer
//! and one query module per table.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod sql;

use gramlens_core::errors::StorageError;
use rusqlite::ErrorCode as SqliteCode;

pub use connection::DatabaseManager;

/// Map a rusqlite error onto the storage error taxonomy.
///
/// A statement stopped by the progress handler becomes `Interrupted`; a file
/// that cannot be opened or read as a database becomes `Unreachable`.
pub fn to_storage_err(e: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(ref err, _) = e {
        match err.code {
            SqliteCode::OperationInterrupted => return StorageError::Interrupted,
            SqliteCode::CannotOpen
            | SqliteCode::NotADatabase
            | SqliteCode::SystemIoFailure
            | SqliteCode::PermissionDenied => {
                return StorageError::Unreachable {
                    message: e.to_string(),
                }
            }
            _ => {}
        }
    }
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_statements_map_to_interrupted() {
        let e = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_INTERRUPT),
            None,
        );
        assert!(matches!(to_storage_err(e), StorageError::Interrupted));
    }

    #[test]
    fn unopenable_files_are_unreachable() {
        let e = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            None,
        );
        assert!(matches!(to_storage_err(e), StorageError::Unreachable { .. }));
    }
}
