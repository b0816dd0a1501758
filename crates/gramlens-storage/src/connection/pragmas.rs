//! PRAGMA configuration applied to every SQLite connection.

use std::time::Duration;

use gramlens_core::errors::StorageError;
use rusqlite::Connection;

use crate::to_storage_err;

/// Pragmas for the writer: WAL, NORMAL sync, foreign keys on.
/// Foreign keys drive the example/relation cascade when a pattern is deleted.
pub fn apply_pragmas(conn: &Connection, busy_timeout: Duration) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA mmap_size = 268435456;
        PRAGMA cache_size = -64000;
        PRAGMA foreign_keys = ON;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(to_storage_err)?;
    conn.busy_timeout(busy_timeout).map_err(to_storage_err)?;
    Ok(())
}

/// Pragmas for pooled read connections.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout: Duration) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA mmap_size = 268435456;
        PRAGMA cache_size = -64000;
        PRAGMA query_only = ON;
        ",
    )
    .map_err(to_storage_err)?;
    conn.busy_timeout(busy_timeout).map_err(to_storage_err)?;
    Ok(())
}

/// Whether WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> Result<bool, StorageError> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(to_storage_err)?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
