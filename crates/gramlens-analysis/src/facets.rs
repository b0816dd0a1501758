//! Faceted suggestions: ranked refinement values per position and dimension.

use std::collections::BTreeSet;
use std::time::Instant;

use gramlens_core::errors::AnalysisError;
use gramlens_core::filter::{BlockId, FilterModel, RuleId};
use gramlens_core::predicate::compile;
use gramlens_core::tracing::metrics;
use gramlens_core::types::{FacetValue, Feature, Suggestion, SuggestionMap, Thresholds, FACET_FEATURES};
use gramlens_storage::queries::{aggregates, ngrams};
use gramlens_storage::sql::render_predicate;
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::scan::ScanContext;

/// Suggestions for every position below the longest selected length.
///
/// A (position, dimension) pair already pinned by an active include rule is
/// not offered. Values are aggregated over the rows matching the whole
/// model, filtered by `thresholds`, and each position's list is sorted by
/// frequency descending. With no lengths selected the longest ngram in the
/// scanned table bounds the positions; `max_positions` caps them either way.
pub fn suggestions(
    scan: &ScanContext<'_>,
    model: &FilterModel,
    lengths: &BTreeSet<u32>,
    thresholds: Thresholds,
    max_positions: Option<u32>,
) -> Result<SuggestionMap, AnalysisError> {
    let longest = match lengths.last() {
        Some(&l) => l,
        None => scan
            .read(|conn, table| ngrams::distinct_lengths(conn, table))?
            .last()
            .copied()
            .unwrap_or(0),
    };
    let positions = max_positions.map_or(longest, |cap| longest.min(cap));

    let fragment = render_predicate(&compile(model, lengths, None));
    let tasks: Vec<(u32, Feature)> = (0..positions)
        .flat_map(|position| FACET_FEATURES.iter().map(move |&feature| (position, feature)))
        .filter(|&(position, feature)| !model.pins(position, feature))
        .collect();

    let started = Instant::now();
    let results = tasks
        .par_iter()
        .map(|&(position, feature)| {
            let task_started = Instant::now();
            let values = scan.read(|conn, table| {
                aggregates::slot_values(conn, table, &fragment, feature, position, thresholds)
            })?;
            tracing::debug!(
                position,
                feature = %feature,
                values = values.len(),
                { metrics::FACET_QUERY_TIME } = task_started.elapsed().as_millis() as u64,
                "facet slot aggregated"
            );
            Ok((position, feature, values))
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    tracing::debug!(
        { metrics::FACET_TASKS } = tasks.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "facets computed"
    );

    let mut map = SuggestionMap::new();
    for position in 0..positions {
        map.insert(position, Vec::new());
    }
    let mut seen: FxHashSet<(u32, Feature, String)> = FxHashSet::default();
    for (position, feature, values) in results {
        let list = map.entry(position).or_default();
        for v in values {
            if seen.insert((position, feature, v.value.clone())) {
                list.push(Suggestion {
                    feature,
                    value: v.value,
                    frequency: v.frequency,
                    quantity: v.quantity,
                });
            }
        }
    }
    for list in map.values_mut() {
        list.sort_by(|a, b| {
            b.frequency
                .total_cmp(&a.frequency)
                .then_with(|| a.feature.cmp(&b.feature))
                .then_with(|| a.value.cmp(&b.value))
        });
    }
    Ok(map)
}

/// The values offered for one rule: its dimension at its block's position,
/// aggregated over the rows matching every other rule of the model.
pub fn rule_options(
    scan: &ScanContext<'_>,
    model: &FilterModel,
    block_id: &BlockId,
    rule_id: &RuleId,
    lengths: &BTreeSet<u32>,
    thresholds: Thresholds,
) -> Result<Vec<FacetValue>, AnalysisError> {
    let block = model.block(block_id)?;
    let rule = model.rule(block_id, rule_id)?;
    if rule.feature == Feature::Unrecognized {
        return Ok(Vec::new());
    }
    let fragment = render_predicate(&compile(model, lengths, Some((block_id, rule_id))));
    scan.read(|conn, table| {
        aggregates::slot_values(conn, table, &fragment, rule.feature, block.position, thresholds)
    })
}
