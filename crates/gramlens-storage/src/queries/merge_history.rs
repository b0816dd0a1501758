//! Queries for `merge_history`: one row per source pattern consumed by a
//! merge batch.

use gramlens_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension};

use crate::to_storage_err;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRecord {
    pub batch_id: String,
    pub source_id: i64,
    pub target_id: i64,
    pub merged_at: i64,
}

pub fn record(
    conn: &Connection,
    batch_id: &str,
    source_id: i64,
    target_id: i64,
    merged_at: i64,
) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO merge_history (batch_id, source_id, target_id, merged_at)
         VALUES (?1, ?2, ?3, ?4)",
    )
    .and_then(|mut stmt| stmt.execute(params![batch_id, source_id, target_id, merged_at]))
    .map_err(to_storage_err)?;
    Ok(())
}

/// The target a pattern was most recently merged into, if it ever was.
pub fn merged_into(conn: &Connection, source_id: i64) -> Result<Option<i64>, StorageError> {
    conn.prepare_cached(
        "SELECT target_id FROM merge_history WHERE source_id = ?1 ORDER BY id DESC LIMIT 1",
    )
    .and_then(|mut stmt| stmt.query_row(params![source_id], |row| row.get(0)).optional())
    .map_err(to_storage_err)
}

pub fn for_batch(conn: &Connection, batch_id: &str) -> Result<Vec<MergeRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT batch_id, source_id, target_id, merged_at FROM merge_history
             WHERE batch_id = ?1 ORDER BY id",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![batch_id], |row| {
            Ok(MergeRecord {
                batch_id: row.get(0)?,
                source_id: row.get(1)?,
                target_id: row.get(2)?,
                merged_at: row.get(3)?,
            })
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Most recent records first.
pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<MergeRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT batch_id, source_id, target_id, merged_at FROM merge_history
             ORDER BY id DESC LIMIT ?1",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(MergeRecord {
                batch_id: row.get(0)?,
                source_id: row.get(1)?,
                target_id: row.get(2)?,
                merged_at: row.get(3)?,
            })
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}
