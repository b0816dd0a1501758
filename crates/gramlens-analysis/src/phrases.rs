//! Phrase search and frequent-sequence lookup over a filtered corpus.

use std::collections::BTreeSet;

use gramlens_core::errors::AnalysisError;
use gramlens_core::filter::FilterModel;
use gramlens_core::predicate::compile;
use gramlens_core::types::Feature;
use gramlens_storage::queries::aggregates::{self, SequenceRow};
use gramlens_storage::queries::phrases::{self, PhraseRow};
use gramlens_storage::sql::render_predicate;

use crate::scan::ScanContext;

/// Ngrams matching `model` within `lengths` whose own frequency reaches
/// `min_frequency`, most frequent first.
pub fn search(
    scan: &ScanContext<'_>,
    model: &FilterModel,
    lengths: &BTreeSet<u32>,
    min_frequency: f64,
    limit: Option<usize>,
) -> Result<Vec<PhraseRow>, AnalysisError> {
    let fragment = render_predicate(&compile(model, lengths, None));
    scan.read(|conn, table| phrases::search(conn, table, &fragment, min_frequency, limit))
}

/// The most frequent complete runs of `feature` among matching ngrams of
/// exactly `phrase_length` tokens. Feeding a run to
/// [`FilterModel::fill_sequence`] pins it position by position.
pub fn frequent_sequences(
    scan: &ScanContext<'_>,
    model: &FilterModel,
    feature: Feature,
    phrase_length: u32,
    limit: usize,
) -> Result<Vec<SequenceRow>, AnalysisError> {
    let lengths = BTreeSet::from([phrase_length]);
    let fragment = render_predicate(&compile(model, &lengths, None));
    scan.read(|conn, table| {
        aggregates::frequent_sequences(conn, table, &fragment, feature, phrase_length, limit)
    })
}
