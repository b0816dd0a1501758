//! Grouped aggregations over an ngram table filtered by a rendered predicate.

use gramlens_core::constants::MAX_SEQUENCE_LENGTH;
use gramlens_core::errors::StorageError;
use gramlens_core::types::{FacetValue, Feature, Thresholds};
use rusqlite::Connection;

use crate::sql::{json_path, SqlFragment, TableName};
use crate::to_storage_err;

/// A run of values across every position of a phrase, with its aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRow {
    pub values: Vec<String>,
    pub frequency: f64,
    pub quantity: u64,
}

/// Distinct values of `feature` at `position` among rows matching
/// `predicate`, with Σfreq_mln and row count, filtered by `thresholds` and
/// ordered by frequency descending. For `morph` every tag of the slot's set
/// counts as a value.
pub fn slot_values(
    conn: &Connection,
    table: &TableName,
    predicate: &SqlFragment,
    feature: Feature,
    position: u32,
    thresholds: Thresholds,
) -> Result<Vec<FacetValue>, StorageError> {
    let Some(col) = feature.column() else {
        return Ok(Vec::new());
    };
    let mut q = if feature.is_set_valued() {
        let mut q = SqlFragment::new(format!(
            "SELECT v.value, SUM(n.freq_mln), COUNT(*) FROM {table} AS n, json_each(n.{col}, "
        ));
        q.push_param(json_path(position));
        q.push_sql(") AS v WHERE ");
        q
    } else {
        let mut q = SqlFragment::new(format!("SELECT json_extract(n.{col}, "));
        q.push_param(json_path(position));
        q.push_sql(&format!(") AS value, SUM(n.freq_mln), COUNT(*) FROM {table} AS n WHERE "));
        q
    };
    q.push_sql(&format!("json_array_length(n.{col}) > "));
    q.push_param(i64::from(position));
    q.push_sql(" AND ");
    q.append(predicate.clone());
    q.push_sql(" GROUP BY 1 HAVING SUM(n.freq_mln) >= ");
    q.push_param(thresholds.min_frequency);
    q.push_sql(" AND COUNT(*) >= ");
    q.push_param(i64::try_from(thresholds.min_quantity).unwrap_or(i64::MAX));
    q.push_sql(" ORDER BY 2 DESC, 1");

    let mut stmt = conn.prepare(&q.sql).map_err(to_storage_err)?;
    let rows = stmt
        .query_map(q.bind(), |row| {
            let value: Option<String> = row.get(0)?;
            let frequency: f64 = row.get(1)?;
            let quantity: i64 = row.get(2)?;
            Ok(value.map(|value| FacetValue {
                value,
                frequency,
                quantity: quantity.max(0) as u64,
            }))
        })
        .map_err(to_storage_err)?;
    let mut out = Vec::new();
    for row in rows {
        if let Some(v) = row.map_err(to_storage_err)? {
            out.push(v);
        }
    }
    Ok(out)
}

/// The most frequent full-length runs of a scalar `feature` among rows of
/// exactly `phrase_length` tokens matching `predicate`. Set-valued features
/// and lengths outside `1..=MAX_SEQUENCE_LENGTH` yield nothing.
pub fn frequent_sequences(
    conn: &Connection,
    table: &TableName,
    predicate: &SqlFragment,
    feature: Feature,
    phrase_length: u32,
    limit: usize,
) -> Result<Vec<SequenceRow>, StorageError> {
    let col = match feature.column() {
        Some(col) if !feature.is_set_valued() => col,
        _ => return Ok(Vec::new()),
    };
    if !(1..=MAX_SEQUENCE_LENGTH).contains(&phrase_length) {
        return Ok(Vec::new());
    }

    let mut q = SqlFragment::new("SELECT ");
    for i in 0..phrase_length {
        q.push_sql(&format!("json_extract(n.{col}, "));
        q.push_param(json_path(i));
        q.push_sql("), ");
    }
    q.push_sql(&format!(
        "SUM(n.freq_mln), COUNT(*) FROM {table} AS n WHERE n.len = "
    ));
    q.push_param(i64::from(phrase_length));
    q.push_sql(&format!(" AND json_array_length(n.{col}) = "));
    q.push_param(i64::from(phrase_length));
    q.push_sql(" AND ");
    q.append(predicate.clone());
    let group_by: Vec<String> = (1..=phrase_length).map(|i| i.to_string()).collect();
    q.push_sql(&format!(
        " GROUP BY {} ORDER BY {} DESC LIMIT ",
        group_by.join(", "),
        phrase_length + 1
    ));
    q.push_param(limit as i64);

    let width = phrase_length as usize;
    let mut stmt = conn.prepare(&q.sql).map_err(to_storage_err)?;
    let rows = stmt
        .query_map(q.bind(), |row| {
            let values = (0..width)
                .map(|i| row.get::<_, Option<String>>(i).map(Option::unwrap_or_default))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            let quantity: i64 = row.get(width + 1)?;
            Ok(SequenceRow {
                values,
                frequency: row.get(width)?,
                quantity: quantity.max(0) as u64,
            })
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}
