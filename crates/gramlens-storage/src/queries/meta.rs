//! Corpus metadata: the generation counter.

use gramlens_core::errors::StorageError;
use rusqlite::Connection;

use crate::to_storage_err;

/// Current corpus generation. Bumped by every committed merge batch.
pub fn generation(conn: &Connection) -> Result<u64, StorageError> {
    let value: i64 = conn
        .query_row(
            "SELECT COALESCE((SELECT value FROM corpus_meta WHERE key = 'generation'), 0)",
            [],
            |row| row.get(0),
        )
        .map_err(to_storage_err)?;
    Ok(value.max(0) as u64)
}

/// Increment the generation and return the new value.
pub fn bump_generation(conn: &Connection) -> Result<u64, StorageError> {
    conn.execute(
        "INSERT INTO corpus_meta (key, value) VALUES ('generation', 1)
         ON CONFLICT (key) DO UPDATE SET value = value + 1",
        [],
    )
    .map_err(to_storage_err)?;
    generation(conn)
}
