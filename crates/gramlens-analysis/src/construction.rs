//! Decomposition and construction lookup over precomputed pattern relations.

use gramlens_core::errors::AnalysisError;
use gramlens_core::signature::{glue, split};
use gramlens_core::types::{Pattern, PatternSummary};
use gramlens_storage::queries::patterns;
use gramlens_storage::queries::relations::{self, Side};
use gramlens_storage::DatabaseManager;
use serde::{Deserialize, Serialize};

/// One way to split a parent pattern, with each relaxed child resolved to
/// its most frequent concrete pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionOption {
    pub split_position: u32,
    /// Full signatures of the two halves of the parent's own text.
    pub child_1_signature: String,
    pub child_2_signature: String,
    pub child_1_relaxed_signature: String,
    pub child_2_relaxed_signature: String,
    pub child_1: Option<PatternSummary>,
    pub child_2: Option<PatternSummary>,
    /// The larger of the two resolved children's frequencies.
    pub score: f64,
}

/// A parent pattern the source takes part in, with the partner it glues to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionOption {
    pub split_position: u32,
    pub partner_relaxed_signature: String,
    pub partner: Option<PatternSummary>,
    pub parent: PatternSummary,
    /// `glue` of the source and the resolved partner in relation order.
    pub glued_signature: Option<String>,
    /// Whether the glued signature reproduces the parent exactly.
    pub exact: bool,
}

/// Construction results, each side ordered by parent frequency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constructions {
    /// The source is the left child.
    pub glues_before: Vec<ConstructionOption>,
    /// The source is the right child.
    pub glues_after: Vec<ConstructionOption>,
}

fn pattern(db: &DatabaseManager, id: i64) -> Result<Pattern, AnalysisError> {
    db.with_reader(|conn| patterns::get(conn, id))?
        .ok_or(AnalysisError::PatternNotFound { pattern_id: id })
}

/// Every stored decomposition of `parent_id`, best score first.
pub fn decompose(db: &DatabaseManager, parent_id: i64) -> Result<Vec<DecompositionOption>, AnalysisError> {
    let parent = pattern(db, parent_id)?;
    let rows = db.with_reader(|conn| relations::decompositions(conn, parent_id))?;
    let length = parent.phrase_length as usize;

    let mut options = Vec::with_capacity(rows.len());
    for row in rows {
        let (child_1_signature, child_2_signature) =
            match split(&parent.pattern_text, length, row.split_position as usize) {
                Ok(halves) => halves,
                Err(e) => {
                    tracing::warn!(parent_id, split = row.split_position, error = %e, "skipping relation");
                    continue;
                }
            };
        let freq = |c: &Option<PatternSummary>| c.as_ref().map_or(0.0, |p| p.total_frequency);
        let score = freq(&row.child_1).max(freq(&row.child_2));
        options.push(DecompositionOption {
            split_position: row.split_position,
            child_1_signature,
            child_2_signature,
            child_1_relaxed_signature: row.child_1_relaxed_signature,
            child_2_relaxed_signature: row.child_2_relaxed_signature,
            child_1: row.child_1,
            child_2: row.child_2,
            score,
        });
    }
    options.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.split_position.cmp(&b.split_position))
    });
    Ok(options)
}

/// Parents built from the source's relaxed signature.
///
/// `top_k` limits each side on its own, ranked by parent frequency, so the
/// result holds up to `2 * top_k` options: `top_k` in `glues_before` and
/// `top_k` in `glues_after`.
pub fn construct(db: &DatabaseManager, source_id: i64, top_k: usize) -> Result<Constructions, AnalysisError> {
    let source = pattern(db, source_id)?;
    let rows = db.with_reader(|conn| relations::constructions(conn, &source.relaxed_signature, top_k))?;
    let source_len = source.phrase_length as usize;

    let mut out = Constructions::default();
    for row in rows {
        let glued_signature = row.partner.as_ref().map(|p| {
            let partner_len = p.phrase_length as usize;
            match row.side {
                Side::Before => glue(&source.pattern_text, source_len, &p.pattern_text, partner_len),
                Side::After => glue(&p.pattern_text, partner_len, &source.pattern_text, source_len),
            }
        });
        let exact = glued_signature.as_deref() == Some(row.parent.pattern_text.as_str());
        let option = ConstructionOption {
            split_position: row.split_position,
            partner_relaxed_signature: row.partner_relaxed_signature,
            partner: row.partner,
            parent: row.parent,
            glued_signature,
            exact,
        };
        match row.side {
            Side::Before => out.glues_before.push(option),
            Side::After => out.glues_after.push(option),
        }
    }
    Ok(out)
}

/// Lengths of patterns that have at least one stored decomposition.
pub fn parent_lengths(db: &DatabaseManager) -> Result<Vec<u32>, AnalysisError> {
    Ok(db.with_reader(|conn| relations::parent_lengths(conn))?)
}

/// Decomposable patterns of one length, most frequent first.
pub fn parents_of_length(db: &DatabaseManager, phrase_length: u32) -> Result<Vec<PatternSummary>, AnalysisError> {
    Ok(db.with_reader(|conn| relations::parents_of_length(conn, phrase_length))?)
}
