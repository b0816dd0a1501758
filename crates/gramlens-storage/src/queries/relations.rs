//! Queries for `pattern_relations_relaxed`.
//!
//! A relaxed child signature is resolved to one concrete pattern: the most
//! frequent pattern carrying that relaxed signature (ties by lowest id).

use gramlens_core::errors::StorageError;
use gramlens_core::types::{PatternRelation, PatternSummary};
use rusqlite::{params, Connection};

use super::patterns::map_summary_at;
use crate::to_storage_err;

/// One relation row of a parent with both children resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionRow {
    pub split_position: u32,
    pub child_1_relaxed_signature: String,
    pub child_2_relaxed_signature: String,
    pub child_1: Option<PatternSummary>,
    pub child_2: Option<PatternSummary>,
}

/// Which side of a relation the source pattern occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The source is `child_1`: it glues before its partner.
    Before,
    /// The source is `child_2`: it glues after its partner.
    After,
}

/// One relation in which the source pattern takes part.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionRow {
    pub side: Side,
    pub split_position: u32,
    pub partner_relaxed_signature: String,
    pub partner: Option<PatternSummary>,
    pub parent: PatternSummary,
}

pub fn insert(conn: &Connection, relation: &PatternRelation) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO pattern_relations_relaxed
            (parent_pattern_id, child_1_relaxed_signature, child_2_relaxed_signature, split_position)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            relation.parent_pattern_id,
            relation.child_1_relaxed_signature,
            relation.child_2_relaxed_signature,
            relation.split_position
        ],
    )
    .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn for_parent(conn: &Connection, parent_id: i64) -> Result<Vec<PatternRelation>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT parent_pattern_id, child_1_relaxed_signature, child_2_relaxed_signature,
                    split_position
             FROM pattern_relations_relaxed WHERE parent_pattern_id = ?1
             ORDER BY split_position, id",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![parent_id], |row| {
            Ok(PatternRelation {
                parent_pattern_id: row.get(0)?,
                child_1_relaxed_signature: row.get(1)?,
                child_2_relaxed_signature: row.get(2)?,
                split_position: row.get(3)?,
            })
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Every relation of `parent_id` with each child signature resolved.
pub fn decompositions(conn: &Connection, parent_id: i64) -> Result<Vec<DecompositionRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "WITH rel AS (
                SELECT id, child_1_relaxed_signature AS c1, child_2_relaxed_signature AS c2,
                       split_position
                FROM pattern_relations_relaxed WHERE parent_pattern_id = ?1
             ), ranked AS (
                SELECT id, pattern_text, phrase_length, total_frequency, total_quantity,
                       relaxed_signature,
                       ROW_NUMBER() OVER (
                           PARTITION BY relaxed_signature ORDER BY total_frequency DESC, id
                       ) AS rn
                FROM unique_patterns
                WHERE relaxed_signature IN (SELECT c1 FROM rel UNION SELECT c2 FROM rel)
             )
             SELECT rel.split_position, rel.c1, rel.c2,
                    a.id, a.pattern_text, a.phrase_length, a.total_frequency, a.total_quantity,
                    b.id, b.pattern_text, b.phrase_length, b.total_frequency, b.total_quantity
             FROM rel
             LEFT JOIN ranked a ON a.relaxed_signature = rel.c1 AND a.rn = 1
             LEFT JOIN ranked b ON b.relaxed_signature = rel.c2 AND b.rn = 1
             ORDER BY rel.split_position, rel.id",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![parent_id], |row| {
            Ok(DecompositionRow {
                split_position: row.get(0)?,
                child_1_relaxed_signature: row.get(1)?,
                child_2_relaxed_signature: row.get(2)?,
                child_1: map_summary_at(row, 3)?,
                child_2: map_summary_at(row, 8)?,
            })
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Relations where `relaxed_signature` is a child, at most `per_side` per
/// side, each side ordered by parent frequency descending.
pub fn constructions(
    conn: &Connection,
    relaxed_signature: &str,
    per_side: usize,
) -> Result<Vec<ConstructionRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "WITH rel AS (
                SELECT parent_pattern_id, split_position, 1 AS side,
                       child_2_relaxed_signature AS partner_sig
                FROM pattern_relations_relaxed WHERE child_1_relaxed_signature = ?1
                UNION ALL
                SELECT parent_pattern_id, split_position, 2 AS side,
                       child_1_relaxed_signature AS partner_sig
                FROM pattern_relations_relaxed WHERE child_2_relaxed_signature = ?1
             ), ranked AS (
                SELECT id, pattern_text, phrase_length, total_frequency, total_quantity,
                       relaxed_signature,
                       ROW_NUMBER() OVER (
                           PARTITION BY relaxed_signature ORDER BY total_frequency DESC, id
                       ) AS rn
                FROM unique_patterns
                WHERE relaxed_signature IN (SELECT partner_sig FROM rel)
             ), joined AS (
                SELECT rel.side, rel.split_position, rel.partner_sig,
                       p.id AS p_id, p.pattern_text AS p_text, p.phrase_length AS p_len,
                       p.total_frequency AS p_freq, p.total_quantity AS p_qty,
                       c.id AS c_id, c.pattern_text AS c_text, c.phrase_length AS c_len,
                       c.total_frequency AS c_freq, c.total_quantity AS c_qty,
                       ROW_NUMBER() OVER (
                           PARTITION BY rel.side ORDER BY p.total_frequency DESC, p.id
                       ) AS side_rank
                FROM rel
                JOIN unique_patterns p ON p.id = rel.parent_pattern_id
                LEFT JOIN ranked c ON c.relaxed_signature = rel.partner_sig AND c.rn = 1
             )
             SELECT side, split_position, partner_sig,
                    p_id, p_text, p_len, p_freq, p_qty,
                    c_id, c_text, c_len, c_freq, c_qty
             FROM joined WHERE side_rank <= ?2
             ORDER BY side, side_rank",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![relaxed_signature, per_side as i64], |row| {
            let side: i64 = row.get(0)?;
            let parent = map_summary_at(row, 3)?.ok_or(rusqlite::Error::InvalidColumnType(
                3,
                "p_id".to_string(),
                rusqlite::types::Type::Null,
            ))?;
            Ok(ConstructionRow {
                side: if side == 1 { Side::Before } else { Side::After },
                split_position: row.get(1)?,
                partner_relaxed_signature: row.get(2)?,
                partner: map_summary_at(row, 8)?,
                parent,
            })
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Lengths of patterns that have at least one decomposition.
pub fn parent_lengths(conn: &Connection) -> Result<Vec<u32>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT DISTINCT up.phrase_length FROM unique_patterns up
             JOIN pattern_relations_relaxed r ON up.id = r.parent_pattern_id
             ORDER BY up.phrase_length",
        )
        .map_err(to_storage_err)?;
    let rows = stmt.query_map([], |row| row.get(0)).map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Patterns of one length that have decompositions, most frequent first.
pub fn parents_of_length(conn: &Connection, phrase_length: u32) -> Result<Vec<PatternSummary>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT up.id, up.pattern_text, up.phrase_length, up.total_frequency, up.total_quantity
             FROM unique_patterns up
             WHERE up.phrase_length = ?1
               AND EXISTS (SELECT 1 FROM pattern_relations_relaxed r WHERE r.parent_pattern_id = up.id)
             ORDER BY up.total_frequency DESC, up.id",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![phrase_length], |row| {
            Ok(PatternSummary {
                id: row.get(0)?,
                pattern_text: row.get(1)?,
                phrase_length: row.get(2)?,
                total_frequency: row.get(3)?,
                total_quantity: row.get(4)?,
            })
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}
