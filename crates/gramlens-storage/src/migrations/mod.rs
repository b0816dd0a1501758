//! Versioned schema migrations tracked in `PRAGMA user_version`.

pub mod v001_corpus;
pub mod v002_relations;
pub mod v003_saved_filters;
pub mod v004_merge_history;

use gramlens_core::errors::StorageError;
use rusqlite::Connection;

/// Ordered (version, SQL) pairs. Versions are contiguous from 1.
pub const MIGRATIONS: &[(u32, &str)] = &[
    (1, v001_corpus::MIGRATION_SQL),
    (2, v002_relations::MIGRATION_SQL),
    (3, v003_saved_filters::MIGRATION_SQL),
    (4, v004_merge_history::MIGRATION_SQL),
];

/// Latest schema version this build knows.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |(v, _)| *v)
}

/// Current schema version of a database.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(crate::to_storage_err)
}

/// Apply every migration newer than the database's `user_version`, each in
/// its own transaction.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current = current_version(conn)?;
    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        let batch = format!("BEGIN;\n{sql}\nPRAGMA user_version = {version};\nCOMMIT;");
        if let Err(e) = conn.execute_batch(&batch) {
            let _ = conn.execute_batch("ROLLBACK;");
            return Err(StorageError::MigrationFailed {
                version,
                message: e.to_string(),
            });
        }
        tracing::info!(version, "applied corpus migration");
    }
    Ok(())
}
