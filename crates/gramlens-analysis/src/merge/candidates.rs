//! Merge candidate finder.
//!
//! Patterns of one length are loaded once. For each difference level the
//! finder enumerates every slot subset of that size, masks the signature of
//! each eligible pattern and buckets patterns by masked signature. Subsets
//! are independent, so they are evaluated in parallel.
//!
//! Among groups of the first level that yields any, the winner is the one
//! with the greatest summed frequency; ties go to lower-risk difference
//! types (tag < pos < dep), then to the earlier subset in enumeration order,
//! then to the group with the smaller lowest id.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use gramlens_core::constants::SIGNATURE_BLOCKS;
use gramlens_core::errors::{AnalysisError, SignatureError};
use gramlens_core::signature::{mask, slot_ref, Blocks};
use gramlens_core::tracing::metrics;
use gramlens_core::types::{Feature, MergeCandidateGroup, Moderation, Pattern};
use gramlens_storage::queries::{examples, ngrams, patterns};
use gramlens_storage::DatabaseManager;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::scan::ScanContext;

type Subset = SmallVec<[usize; 3]>;

struct Candidate {
    id: i64,
    total_frequency: f64,
    moderation: Moderation,
    pattern_text: String,
}

/// The best bucket of one subset.
struct SubsetGroup {
    order: usize,
    slots: Subset,
    members: Vec<usize>,
    total_frequency: f64,
    risk: (u8, u32),
}

enum SubsetOutcome {
    Group(SubsetGroup),
    Empty,
    Failed,
    Aborted,
}

/// The highest-priority group of near-duplicate patterns of
/// `phrase_length`, trying difference levels `1..=max_level` in order.
///
/// Patterns whose text has the wrong part count are skipped with a warning.
/// A subset that fails is logged and skipped; only when every evaluated
/// subset failed is [`AnalysisError::AllSubsetsFailed`] returned.
pub fn find_candidates(
    scan: &ScanContext<'_>,
    phrase_length: u32,
    max_level: usize,
) -> Result<Option<MergeCandidateGroup>, AnalysisError> {
    let length = phrase_length as usize;
    if length == 0 {
        return Ok(None);
    }
    let loaded = scan.read(|conn, _| patterns::by_length(conn, phrase_length))?;
    let candidates: Vec<Candidate> = loaded
        .into_iter()
        .filter(|p| match Blocks::parse_exact(&p.pattern_text, length) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(pattern_id = p.id, error = %e, "skipping unmaskable pattern");
                false
            }
        })
        .map(|p| Candidate {
            id: p.id,
            total_frequency: p.total_frequency,
            moderation: p.moderation,
            pattern_text: p.pattern_text,
        })
        .collect();
    if candidates.len() < 2 {
        return Ok(None);
    }

    let total_slots = SIGNATURE_BLOCKS * length;
    let mut evaluated = 0usize;
    let mut failed = 0usize;
    for level in 1..=max_level.min(total_slots) {
        let subsets = subsets_of(total_slots, level);
        let outcomes: Vec<SubsetOutcome> = subsets
            .par_iter()
            .enumerate()
            .map(|(order, slots)| {
                if scan.check().is_err() {
                    return SubsetOutcome::Aborted;
                }
                match best_bucket(&candidates, length, order, slots) {
                    Ok(Some(group)) => SubsetOutcome::Group(group),
                    Ok(None) => SubsetOutcome::Empty,
                    Err(e) => {
                        tracing::warn!(level, subset = ?slots.as_slice(), error = %e, "candidate subset failed");
                        SubsetOutcome::Failed
                    }
                }
            })
            .collect();
        scan.check()?;

        evaluated += outcomes.len();
        let mut best: Option<SubsetGroup> = None;
        for outcome in outcomes {
            match outcome {
                SubsetOutcome::Group(group) => {
                    if best
                        .as_ref()
                        .map_or(true, |b| rank(&group, b, &candidates) == Ordering::Less)
                    {
                        best = Some(group);
                    }
                }
                SubsetOutcome::Failed => failed += 1,
                SubsetOutcome::Empty | SubsetOutcome::Aborted => {}
            }
        }

        if let Some(best) = best {
            tracing::info!(
                phrase_length,
                { metrics::DIFFERENCE_LEVEL } = level,
                { metrics::CANDIDATE_SUBSETS } = subsets.len(),
                members = best.members.len(),
                "merge candidate group found"
            );
            return Ok(Some(into_group(best, &candidates, length, level)?));
        }
    }

    if evaluated > 0 && failed == evaluated {
        return Err(AnalysisError::AllSubsetsFailed {
            phrase_length: length,
        });
    }
    Ok(None)
}

/// Every size-`k` subset of `0..n` in lexicographic order.
fn subsets_of(n: usize, k: usize) -> Vec<Subset> {
    let mut out = Vec::new();
    if k == 0 || k > n {
        return out;
    }
    let mut current: Subset = (0..k).collect();
    loop {
        out.push(current.clone());
        // Rightmost index that can still advance.
        let Some(i) = (0..k).rev().find(|&i| current[i] < n - k + i) else {
            return out;
        };
        current[i] += 1;
        for j in i + 1..k {
            current[j] = current[j - 1] + 1;
        }
    }
}

fn subset_features(slots: &[usize], length: usize) -> Result<BTreeSet<Feature>, SignatureError> {
    slots
        .iter()
        .map(|&s| slot_ref(s, length).map(|r| r.feature))
        .collect()
}

fn best_bucket(
    candidates: &[Candidate],
    length: usize,
    order: usize,
    slots: &Subset,
) -> Result<Option<SubsetGroup>, SignatureError> {
    let features = subset_features(slots, length)?;
    let mut buckets: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (idx, c) in candidates.iter().enumerate() {
        if features.iter().any(|&f| c.moderation.is_moderated(f)) {
            continue;
        }
        let masked = mask(&c.pattern_text, length, slots)?;
        buckets.entry(masked).or_default().push(idx);
    }

    let risk = (
        features.iter().map(Feature::merge_risk).max().unwrap_or(0),
        features.iter().map(|f| u32::from(f.merge_risk())).sum(),
    );
    let best = buckets
        .into_values()
        .filter(|members| members.len() >= 2)
        .map(|members| {
            let total_frequency = members.iter().map(|&i| candidates[i].total_frequency).sum();
            SubsetGroup {
                order,
                slots: slots.clone(),
                members,
                total_frequency,
                risk,
            }
        })
        .min_by(|a, b| rank(a, b, candidates));
    Ok(best)
}

/// `Less` when `a` should win over `b`.
fn rank(a: &SubsetGroup, b: &SubsetGroup, candidates: &[Candidate]) -> Ordering {
    let lowest = |g: &SubsetGroup| g.members.iter().map(|&i| candidates[i].id).min();
    b.total_frequency
        .total_cmp(&a.total_frequency)
        .then_with(|| a.risk.cmp(&b.risk))
        .then_with(|| a.order.cmp(&b.order))
        .then_with(|| lowest(a).cmp(&lowest(b)))
}

fn into_group(
    group: SubsetGroup,
    candidates: &[Candidate],
    length: usize,
    level: usize,
) -> Result<MergeCandidateGroup, AnalysisError> {
    let difference_types = subset_features(&group.slots, length)?;
    let members: Vec<Blocks<'_>> = group
        .members
        .iter()
        .map(|&i| Blocks::parse(&candidates[i].pattern_text, length))
        .collect();
    let mut differences = Vec::new();
    for &slot in &group.slots {
        let first = members[0].slot(slot);
        if members.iter().any(|m| m.slot(slot) != first) {
            differences.push(slot_ref(slot, length)?);
        }
    }
    let mut pattern_ids: Vec<i64> = group.members.iter().map(|&i| candidates[i].id).collect();
    pattern_ids.sort_unstable();
    Ok(MergeCandidateGroup {
        pattern_ids,
        difference_level: level,
        difference_types,
        differences,
        total_frequency: group.total_frequency,
    })
}

/// Settle a group without merging: flag every difference type as moderated
/// for all members and record the level. The finder will not offer that
/// distinction for those patterns again.
pub fn skip_group(db: &DatabaseManager, group: &MergeCandidateGroup) -> Result<usize, AnalysisError> {
    let level = u32::try_from(group.difference_level).unwrap_or(u32::MAX);
    let touched = db.with_writer(|conn| {
        patterns::moderate(conn, &group.pattern_ids, &group.difference_types, level)
    })?;
    tracing::info!(
        patterns = touched,
        difference_level = group.difference_level,
        "candidate group skipped"
    );
    Ok(touched)
}

/// Phrase lengths with at least two patterns not yet fully moderated.
pub fn lengths_available_for_merging(db: &DatabaseManager) -> Result<Vec<u32>, AnalysisError> {
    Ok(db.with_reader(|conn| patterns::lengths_with_unmoderated(conn))?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewExample {
    pub text: String,
    pub frequency: f64,
}

/// A pattern with the phrases an analyst reads before deciding on a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReview {
    pub pattern: Pattern,
    pub examples: Vec<ReviewExample>,
}

/// Each pattern with up to `limit` stored examples, falling back to its own
/// most frequent ngrams when it has none.
pub fn patterns_with_examples(
    db: &DatabaseManager,
    ids: &[i64],
    limit: usize,
) -> Result<Vec<PatternReview>, AnalysisError> {
    db.with_reader(|conn| {
        ids.iter()
            .map(|&id| -> Result<PatternReview, AnalysisError> {
                let pattern = patterns::get(conn, id)?
                    .ok_or(AnalysisError::PatternNotFound { pattern_id: id })?;
                let mut found: Vec<ReviewExample> = examples::for_pattern(conn, id, limit)?
                    .into_iter()
                    .map(|e| ReviewExample {
                        text: e.example_text,
                        frequency: e.example_frequency,
                    })
                    .collect();
                if found.is_empty() {
                    found = ngrams::for_pattern(conn, id, limit)?
                        .into_iter()
                        .map(|n| ReviewExample {
                            text: n.text,
                            frequency: n.freq_mln,
                        })
                        .collect();
                }
                Ok(PatternReview {
                    pattern,
                    examples: found,
                })
            })
            .collect()
    })
}
