//! Queries for `unique_patterns`.

use std::collections::BTreeSet;

use gramlens_core::errors::StorageError;
use gramlens_core::signature::relax;
use gramlens_core::types::{Feature, Moderation, Pattern, PatternSummary};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::to_storage_err;

pub(crate) const PATTERN_COLUMNS: &str = "id, pattern_text, phrase_length, total_frequency, \
     total_quantity, relaxed_signature, moderated_dep, moderated_pos, moderated_tag, merged, \
     difference_level";

pub(crate) fn map_pattern(row: &Row<'_>) -> rusqlite::Result<Pattern> {
    Ok(Pattern {
        id: row.get(0)?,
        pattern_text: row.get(1)?,
        phrase_length: row.get(2)?,
        total_frequency: row.get(3)?,
        total_quantity: row.get(4)?,
        relaxed_signature: row.get(5)?,
        moderation: Moderation {
            dep: row.get(6)?,
            pos: row.get(7)?,
            tag: row.get(8)?,
        },
        merged: row.get(9)?,
        difference_level: row.get(10)?,
    })
}

/// Map five consecutive columns starting at `offset`
/// (id, text, length, frequency, quantity). `None` when the id is NULL.
pub(crate) fn map_summary_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Option<PatternSummary>> {
    let id: Option<i64> = row.get(offset)?;
    let Some(id) = id else {
        return Ok(None);
    };
    Ok(Some(PatternSummary {
        id,
        pattern_text: row.get(offset + 1)?,
        phrase_length: row.get(offset + 2)?,
        total_frequency: row.get(offset + 3)?,
        total_quantity: row.get(offset + 4)?,
    }))
}

/// Insert a pattern with zero aggregates; `relaxed_signature` is derived.
pub fn insert(conn: &Connection, pattern_text: &str, phrase_length: u32) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO unique_patterns (pattern_text, phrase_length, relaxed_signature)
         VALUES (?1, ?2, ?3)",
        params![
            pattern_text,
            phrase_length,
            relax(pattern_text, phrase_length as usize)
        ],
    )
    .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Pattern>, StorageError> {
    let sql = format!("SELECT {PATTERN_COLUMNS} FROM unique_patterns WHERE id = ?1");
    conn.prepare_cached(&sql)
        .and_then(|mut stmt| stmt.query_row(params![id], map_pattern).optional())
        .map_err(to_storage_err)
}

/// Every pattern of one phrase length, by id.
pub fn by_length(conn: &Connection, phrase_length: u32) -> Result<Vec<Pattern>, StorageError> {
    let sql = format!(
        "SELECT {PATTERN_COLUMNS} FROM unique_patterns WHERE phrase_length = ?1 ORDER BY id"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![phrase_length], map_pattern)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Lengths that still hold at least two patterns with an unmoderated dimension.
pub fn lengths_with_unmoderated(conn: &Connection) -> Result<Vec<u32>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT phrase_length FROM unique_patterns
             WHERE NOT (moderated_dep AND moderated_pos AND moderated_tag)
             GROUP BY phrase_length HAVING COUNT(*) >= 2
             ORDER BY phrase_length",
        )
        .map_err(to_storage_err)?;
    let rows = stmt.query_map([], |row| row.get(0)).map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Reset a pattern's aggregates to the sum and count of the ngrams it owns.
pub fn recompute_aggregates(conn: &Connection, id: i64) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE unique_patterns SET
            total_frequency = (SELECT COALESCE(SUM(freq_mln), 0.0) FROM ngrams WHERE pattern_id = ?1),
            total_quantity = (SELECT COUNT(*) FROM ngrams WHERE pattern_id = ?1)
         WHERE id = ?1",
        params![id],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

/// Flag a merge target: fully moderated, merged, difference level 0.
pub fn mark_merged(conn: &Connection, id: i64) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE unique_patterns SET
            moderated_dep = 1, moderated_pos = 1, moderated_tag = 1,
            merged = 1, difference_level = 0
         WHERE id = ?1",
        params![id],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

/// Set the moderation flag of every dimension in `types` (never clearing
/// one) and record `difference_level`. Returns the number of rows touched.
pub fn moderate(
    conn: &Connection,
    ids: &[i64],
    types: &BTreeSet<Feature>,
    difference_level: u32,
) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "UPDATE unique_patterns SET
                moderated_dep = moderated_dep OR ?2,
                moderated_pos = moderated_pos OR ?3,
                moderated_tag = moderated_tag OR ?4,
                difference_level = ?5
             WHERE id = ?1",
        )
        .map_err(to_storage_err)?;
    let mut touched = 0;
    for &id in ids {
        touched += stmt
            .execute(params![
                id,
                types.contains(&Feature::Dep),
                types.contains(&Feature::Pos),
                types.contains(&Feature::Tag),
                difference_level
            ])
            .map_err(to_storage_err)?;
    }
    Ok(touched)
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM unique_patterns WHERE id = ?1", params![id])
        .map_err(to_storage_err)
}

pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM unique_patterns", [], |row| row.get(0))
        .map_err(to_storage_err)
}
