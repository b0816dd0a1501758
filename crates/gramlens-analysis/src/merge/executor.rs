//! Atomic execution of a merge plan.

use chrono::Utc;
use gramlens_core::errors::MergeError;
use gramlens_core::tracing::metrics;
use gramlens_core::types::{MergeOperation, MergeOutcome};
use gramlens_storage::connection::writer::with_immediate_transaction;
use gramlens_storage::queries::{merge_history, meta, ngrams, patterns};
use gramlens_storage::DatabaseManager;
use rusqlite::Connection;
use rustc_hash::FxHashSet;
use uuid::Uuid;

use super::plan::MergePlan;

/// Execute every operation of `plan` in one IMMEDIATE transaction.
///
/// For each operation the target's canonical dep/pos/tag arrays are read
/// from its most frequent ngram, every ngram of the sources and the target
/// is moved to the target with those arrays, and the sources are deleted.
/// Then every target gets fresh aggregates, all moderation flags and
/// `merged = true`, the batch is logged and the corpus generation bumped.
///
/// Any failure rolls back the whole batch.
pub fn execute(db: &DatabaseManager, plan: &MergePlan) -> Result<MergeOutcome, MergeError> {
    let batch_id = Uuid::new_v4().to_string();
    let merged_at = Utc::now().timestamp();

    let outcome = db.with_writer(|conn| {
        with_immediate_transaction(conn, |tx| {
            let mut patterns_deleted = 0;
            let mut ngrams_reassigned = 0;
            for op in plan.operations() {
                let (deleted, reassigned) = apply(tx, op)?;
                patterns_deleted += deleted;
                ngrams_reassigned += reassigned;
                for &source in &op.sources {
                    merge_history::record(tx, &batch_id, source, op.target, merged_at)?;
                }
            }

            let mut seen = FxHashSet::default();
            let targets: Vec<i64> = plan
                .targets()
                .into_iter()
                .filter(|t| seen.insert(*t))
                .collect();
            for &target in &targets {
                patterns::recompute_aggregates(tx, target)?;
                patterns::mark_merged(tx, target)?;
            }
            meta::bump_generation(tx)?;

            Ok::<_, MergeError>(MergeOutcome {
                batch_id: batch_id.clone(),
                operations: plan.operations().len(),
                patterns_deleted,
                ngrams_reassigned,
                targets,
            })
        })
    });

    match &outcome {
        Ok(o) => tracing::info!(
            batch_id = %o.batch_id,
            { metrics::MERGE_OPERATIONS } = o.operations,
            { metrics::NGRAMS_REASSIGNED } = o.ngrams_reassigned,
            "merge batch committed"
        ),
        Err(e) => tracing::warn!(
            batch_id = %batch_id,
            pattern_id = ?e.pattern_id(),
            error = %e,
            "merge batch rolled back"
        ),
    }
    outcome
}

/// One operation inside the open transaction. Returns (patterns deleted,
/// ngrams reassigned).
fn apply(conn: &Connection, op: &MergeOperation) -> Result<(usize, usize), MergeError> {
    for &id in op.sources.iter().chain(std::iter::once(&op.target)) {
        if patterns::get(conn, id)?.is_none() {
            return Err(missing(conn, id)?);
        }
    }

    let canonical = ngrams::canonical_annotations(conn, op.target)?.ok_or(
        MergeError::TargetHasNoNgrams {
            pattern_id: op.target,
        },
    )?;

    let mut reassigned = 0;
    for &id in op.sources.iter().chain(std::iter::once(&op.target)) {
        reassigned += ngrams::reassign(conn, id, op.target, &canonical)?;
    }
    let mut deleted = 0;
    for &source in &op.sources {
        deleted += patterns::delete(conn, source)?;
    }
    Ok((deleted, reassigned))
}

/// Tell an id consumed by an earlier merge from one that never existed.
fn missing(conn: &Connection, id: i64) -> Result<MergeError, MergeError> {
    Ok(match merge_history::merged_into(conn, id)? {
        Some(merged_into) => MergeError::StaleReference {
            pattern_id: id,
            merged_into,
        },
        None => MergeError::PatternNotFound { pattern_id: id },
    })
}
