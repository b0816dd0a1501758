//! Queries for `pattern_examples`.

use gramlens_core::errors::StorageError;
use gramlens_core::types::PatternExample;
use rusqlite::{params, Connection};

use crate::to_storage_err;

pub fn insert(
    conn: &Connection,
    pattern_id: i64,
    example_text: &str,
    example_frequency: f64,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO pattern_examples (pattern_id, example_text, example_frequency)
         VALUES (?1, ?2, ?3)",
        params![pattern_id, example_text, example_frequency],
    )
    .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

/// Stored examples of a pattern, most frequent first.
pub fn for_pattern(
    conn: &Connection,
    pattern_id: i64,
    limit: usize,
) -> Result<Vec<PatternExample>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT pattern_id, example_text, example_frequency FROM pattern_examples
             WHERE pattern_id = ?1 ORDER BY example_frequency DESC, id LIMIT ?2",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![pattern_id, limit as i64], |row| {
            Ok(PatternExample {
                pattern_id: row.get(0)?,
                example_text: row.get(1)?,
                example_frequency: row.get(2)?,
            })
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}
