//! Per-session materialized subsets of `ngrams`.
//!
//! A subset is a plain table holding the ngrams of the selected lengths so
//! that facet queries scan fewer rows. It is visible to every connection of
//! the store and must be dropped by its owner.

use std::collections::BTreeSet;

use gramlens_core::errors::StorageError;
use rusqlite::Connection;

use crate::sql::{SqlFragment, TableName};
use crate::to_storage_err;

/// (Re)create `table` with the ngrams whose length is in `lengths`.
/// Returns the number of rows copied.
pub fn create_subset(conn: &Connection, table: &TableName, lengths: &BTreeSet<u32>) -> Result<usize, StorageError> {
    drop_subset(conn, table)?;
    conn.execute_batch(&format!(
        "CREATE TABLE {table} AS SELECT * FROM ngrams WHERE 0;"
    ))
    .map_err(to_storage_err)?;

    if lengths.is_empty() {
        return Ok(0);
    }
    let mut insert = SqlFragment::new(format!("INSERT INTO {table} SELECT * FROM ngrams WHERE len IN "));
    insert.push_list(lengths.iter().map(|&l| i64::from(l)));
    conn.execute(&insert.sql, insert.bind()).map_err(to_storage_err)
}

pub fn drop_subset(conn: &Connection, table: &TableName) -> Result<(), StorageError> {
    conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))
        .map_err(to_storage_err)
}

/// Names of every subset table currently in the database.
pub fn list_subsets(conn: &Connection) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name LIKE 'subset\\_%' ESCAPE '\\' ORDER BY name",
        )
        .map_err(to_storage_err)?;
    let rows = stmt.query_map([], |row| row.get(0)).map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}
