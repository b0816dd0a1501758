//! Queries for the `ngrams` table.

use gramlens_core::errors::StorageError;
use gramlens_core::types::Ngram;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

use crate::sql::TableName;
use crate::to_storage_err;

const NGRAM_COLUMNS: &str =
    "id, text, deps, pos, tags, tokens, lemmas, morph, freq_mln, len, pattern_id";

/// Raw row before the JSON columns are decoded.
struct NgramRow {
    id: i64,
    text: String,
    json: [String; 6],
    freq_mln: f64,
    len: u32,
    pattern_id: Option<i64>,
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NgramRow> {
    Ok(NgramRow {
        id: row.get(0)?,
        text: row.get(1)?,
        json: [
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ],
        freq_mln: row.get(8)?,
        len: row.get(9)?,
        pattern_id: row.get(10)?,
    })
}

pub(crate) fn decode_json<T: DeserializeOwned>(raw: &str, column: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::SqliteError {
        message: format!("malformed JSON in column {column}: {e}"),
    })
}

pub(crate) fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::SqliteError {
        message: format!("cannot encode JSON column: {e}"),
    })
}

fn into_ngram(row: NgramRow) -> Result<Ngram, StorageError> {
    let [deps, pos, tags, tokens, lemmas, morph] = row.json;
    Ok(Ngram {
        id: row.id,
        text: row.text,
        deps: decode_json(&deps, "deps")?,
        pos: decode_json(&pos, "pos")?,
        tags: decode_json(&tags, "tags")?,
        tokens: decode_json(&tokens, "tokens")?,
        lemmas: decode_json(&lemmas, "lemmas")?,
        morph: decode_json(&morph, "morph")?,
        freq_mln: row.freq_mln,
        len: row.len,
        pattern_id: row.pattern_id,
    })
}

/// Insert an ngram; its `id` field is ignored. Returns the new row id.
pub fn insert(conn: &Connection, ngram: &Ngram) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO ngrams (text, deps, pos, tags, tokens, lemmas, morph, freq_mln, len, pattern_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            ngram.text,
            encode_json(&ngram.deps)?,
            encode_json(&ngram.pos)?,
            encode_json(&ngram.tags)?,
            encode_json(&ngram.tokens)?,
            encode_json(&ngram.lemmas)?,
            encode_json(&ngram.morph)?,
            ngram.freq_mln,
            ngram.len,
            ngram.pattern_id,
        ],
    )
    .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Ngram>, StorageError> {
    let sql = format!("SELECT {NGRAM_COLUMNS} FROM ngrams WHERE id = ?1");
    let row = conn
        .prepare_cached(&sql)
        .and_then(|mut stmt| stmt.query_row(params![id], map_row).optional())
        .map_err(to_storage_err)?;
    row.map(into_ngram).transpose()
}

/// Ngrams owned by a pattern, most frequent first.
pub fn for_pattern(conn: &Connection, pattern_id: i64, limit: usize) -> Result<Vec<Ngram>, StorageError> {
    let sql = format!(
        "SELECT {NGRAM_COLUMNS} FROM ngrams WHERE pattern_id = ?1
         ORDER BY freq_mln DESC, id LIMIT ?2"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![pattern_id, limit as i64], map_row)
        .map_err(to_storage_err)?;
    rows.map(|r| r.map_err(to_storage_err).and_then(into_ngram))
        .collect()
}

/// The canonical dep/pos/tag arrays of a pattern: those of its most
/// frequent ngram.
pub fn canonical_annotations(
    conn: &Connection,
    pattern_id: i64,
) -> Result<Option<(String, String, String)>, StorageError> {
    conn.prepare_cached(
        "SELECT deps, pos, tags FROM ngrams WHERE pattern_id = ?1
         ORDER BY freq_mln DESC, id LIMIT 1",
    )
    .and_then(|mut stmt| {
        stmt.query_row(params![pattern_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .optional()
    })
    .map_err(to_storage_err)
}

/// Move every ngram of `from` to `target`, overwriting deps/pos/tags with
/// the given JSON arrays. Tokens, lemmas and morph are left as they are.
pub fn reassign(
    conn: &Connection,
    from: i64,
    target: i64,
    canonical: &(String, String, String),
) -> Result<usize, StorageError> {
    let (deps, pos, tags) = canonical;
    conn.prepare_cached(
        "UPDATE ngrams SET pattern_id = ?2, deps = ?3, pos = ?4, tags = ?5
         WHERE pattern_id = ?1",
    )
    .and_then(|mut stmt| stmt.execute(params![from, target, deps, pos, tags]))
    .map_err(to_storage_err)
}

/// Distinct ngram lengths present in the corpus.
/// Phrase lengths present in `table`, ascending.
pub fn distinct_lengths(conn: &Connection, table: &TableName) -> Result<Vec<u32>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT DISTINCT len FROM {table} ORDER BY len"))
        .map_err(to_storage_err)?;
    let rows = stmt.query_map([], |row| row.get(0)).map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

pub fn count_for_pattern(conn: &Connection, pattern_id: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM ngrams WHERE pattern_id = ?1",
        params![pattern_id],
        |row| row.get(0),
    )
    .map_err(to_storage_err)
}
