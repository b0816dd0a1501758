//! Phrase search: the ngrams matching a rendered predicate.

use gramlens_core::errors::StorageError;
use rusqlite::Connection;

use super::ngrams::decode_json;
use crate::sql::{SqlFragment, TableName};
use crate::to_storage_err;

#[derive(Debug, Clone, PartialEq)]
pub struct PhraseRow {
    pub id: i64,
    pub text: String,
    pub freq_mln: f64,
    pub tokens: Vec<String>,
}

/// Matching rows with `freq_mln >= min_frequency`, most frequent first.
pub fn search(
    conn: &Connection,
    table: &TableName,
    predicate: &SqlFragment,
    min_frequency: f64,
    limit: Option<usize>,
) -> Result<Vec<PhraseRow>, StorageError> {
    let mut q = SqlFragment::new(format!(
        "SELECT n.id, n.text, n.freq_mln, n.tokens FROM {table} AS n WHERE "
    ));
    q.append(predicate.clone());
    q.push_sql(" AND n.freq_mln >= ");
    q.push_param(min_frequency);
    q.push_sql(" ORDER BY n.freq_mln DESC, n.id LIMIT ");
    q.push_param(limit.map_or(-1, |l| l as i64));

    let mut stmt = conn.prepare(&q.sql).map_err(to_storage_err)?;
    let rows = stmt
        .query_map(q.bind(), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(to_storage_err)?;
    let mut out = Vec::new();
    for row in rows {
        let (id, text, freq_mln, tokens) = row.map_err(to_storage_err)?;
        out.push(PhraseRow {
            id,
            text,
            freq_mln,
            tokens: decode_json(&tokens, "tokens")?,
        });
    }
    Ok(out)
}
