//! Candidate finder, skip and merge executor.

use std::sync::Arc;
use std::time::Duration;

use gramlens_analysis::merge::{find_candidates, patterns_with_examples, skip_group};
use gramlens_analysis::{GramlensEngine, ScanContext};
use gramlens_core::config::GramlensConfig;
use gramlens_core::errors::{AnalysisError, MergeError};
use gramlens_core::traits::{Cancellable, CancellationToken};
use gramlens_core::types::{Feature, MergeOperation, SlotRef};
use gramlens_storage::queries::{examples, merge_history, meta, ngrams, patterns};
use gramlens_storage::DatabaseManager;
use test_fixtures::{corpus, seeded_memory_store, CorpusBuilder, Seeded};

fn engine(builder: &CorpusBuilder) -> (GramlensEngine, Seeded) {
    let (db, seeded) = seeded_memory_store(builder);
    (
        GramlensEngine::with_store(Arc::new(db), GramlensConfig::default()),
        seeded,
    )
}

fn scan(db: &DatabaseManager) -> ScanContext<'_> {
    ScanContext::new(db, CancellationToken::new(), Duration::from_secs(30))
}

#[test]
fn tag_only_difference_is_grouped_at_level_one() {
    let (db, seeded) = seeded_memory_store(&corpus("small_corpus"));
    let group = find_candidates(&scan(&db), 2, 3).unwrap().unwrap();

    let mut expected = vec![seeded.id("subj_nom"), seeded.id("subj_gen")];
    expected.sort_unstable();
    assert_eq!(group.pattern_ids, expected);
    assert_eq!(group.difference_level, 1);
    assert_eq!(group.difference_types.iter().copied().collect::<Vec<_>>(), vec![Feature::Tag]);
    assert_eq!(
        group.differences,
        vec![SlotRef {
            feature: Feature::Tag,
            position: 0
        }]
    );
    assert_eq!(group.total_frequency, 20.0);
}

#[test]
fn skipped_group_never_resurfaces() {
    let (db, seeded) = seeded_memory_store(&corpus("small_corpus"));
    let group = find_candidates(&scan(&db), 2, 3).unwrap().unwrap();
    assert_eq!(skip_group(&db, &group).unwrap(), 2);

    let nom = db
        .with_reader(|conn| patterns::get(conn, seeded.id("subj_nom")))
        .unwrap()
        .unwrap();
    assert!(nom.moderation.tag);
    assert!(!nom.moderation.dep);
    assert_eq!(nom.difference_level, 1);

    // The only remaining near-duplicate (subj_nom vs obj_acc) also differs
    // in tag, which is settled for subj_nom.
    assert_eq!(find_candidates(&scan(&db), 2, 3).unwrap(), None);
}

#[test]
fn higher_levels_are_tried_when_lower_ones_are_empty() {
    let builder = CorpusBuilder::new()
        .pattern("a", "nsubj_ROOT_NOUN_VERB_Nom_Act", 2)
        .pattern("b", "obj_ROOT_NOUN_VERB_Acc_Act", 2)
        .ngram("a", "dog runs", 2.0)
        .ngram("b", "ball rolls", 1.0);
    let (db, seeded) = seeded_memory_store(&builder);

    assert_eq!(find_candidates(&scan(&db), 2, 1).unwrap(), None);
    let group = find_candidates(&scan(&db), 2, 3).unwrap().unwrap();
    assert_eq!(group.difference_level, 2);
    assert_eq!(group.pattern_ids, vec![seeded.id("a"), seeded.id("b")]);
    assert_eq!(
        group.difference_types.iter().copied().collect::<Vec<_>>(),
        vec![Feature::Dep, Feature::Tag]
    );
}

#[test]
fn equal_frequency_prefers_tag_over_dep_differences() {
    let builder = CorpusBuilder::new()
        .pattern("base", "nsubj_NOUN_Nom", 1)
        .pattern("dep_variant", "obj_NOUN_Nom", 1)
        .pattern("tag_variant", "nsubj_NOUN_Gen", 1)
        .ngram("base", "dog", 2.0)
        .ngram("dep_variant", "cat", 1.0)
        .ngram("tag_variant", "cow", 1.0);
    let (db, seeded) = seeded_memory_store(&builder);

    let group = find_candidates(&scan(&db), 1, 3).unwrap().unwrap();
    assert_eq!(group.pattern_ids, vec![seeded.id("base"), seeded.id("tag_variant")]);
}

#[test]
fn lengths_without_patterns_have_no_candidates() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    assert_eq!(find_candidates(&scan(&db), 7, 3).unwrap(), None);
    assert_eq!(find_candidates(&scan(&db), 0, 3).unwrap(), None);
}

#[test]
fn merge_reassigns_ngrams_and_recomputes_aggregates() {
    let (engine, seeded) = engine(&corpus("small_corpus"));
    let nom = seeded.id("subj_nom");
    let gen = seeded.id("subj_gen");

    let outcome = engine
        .merge(vec![MergeOperation {
            sources: vec![gen],
            target: nom,
        }])
        .unwrap();
    assert_eq!(outcome.patterns_deleted, 1);
    assert_eq!(outcome.ngrams_reassigned, 3);
    assert_eq!(outcome.targets, vec![nom]);

    engine
        .db()
        .with_reader(|conn| {
            let target = patterns::get(conn, nom)?.unwrap();
            assert_eq!(target.total_frequency, 20.0);
            assert_eq!(target.total_quantity, 3);
            assert!(target.merged);
            assert_eq!(target.difference_level, 0);
            assert!(target.moderation.dep && target.moderation.pos && target.moderation.tag);
            assert!(patterns::get(conn, gen)?.is_none());

            let owned = ngrams::for_pattern(conn, nom, 10)?;
            assert_eq!(owned.len(), 3);
            assert!(owned.iter().all(|n| n.tags == vec!["Nom".to_string(), "Act".to_string()]));
            // Morphology is never rewritten.
            let dogs = owned.iter().find(|n| n.text == "dogs run").unwrap();
            assert_eq!(dogs.morph[0][0], "Case=Gen");

            assert_eq!(meta::generation(conn)?, 1);
            assert_eq!(merge_history::merged_into(conn, gen)?, Some(nom));
            Ok::<_, gramlens_core::errors::StorageError>(())
        })
        .unwrap();
}

#[test]
fn failing_operation_rolls_back_the_whole_batch() {
    let builder = corpus("small_corpus").pattern("empty", "amod_ROOT_ADJ_VERB_Pos_Act", 2);
    let (engine, seeded) = engine(&builder);
    let nom = seeded.id("subj_nom");
    let gen = seeded.id("subj_gen");
    let empty = seeded.id("empty");

    let err = engine
        .merge(vec![
            MergeOperation {
                sources: vec![gen],
                target: nom,
            },
            MergeOperation {
                sources: vec![seeded.id("obj_acc")],
                target: empty,
            },
        ])
        .unwrap_err();
    assert!(matches!(err, MergeError::TargetHasNoNgrams { pattern_id } if pattern_id == empty));
    assert_eq!(err.pattern_id(), Some(empty));

    engine
        .db()
        .with_reader(|conn| {
            assert!(patterns::get(conn, gen)?.is_some());
            assert_eq!(patterns::get(conn, nom)?.unwrap().total_frequency, 17.0);
            assert!(!patterns::get(conn, nom)?.unwrap().merged);
            assert_eq!(ngrams::count_for_pattern(conn, gen)?, 1);
            assert_eq!(meta::generation(conn)?, 0);
            assert!(merge_history::recent(conn, 10)?.is_empty());
            Ok::<_, gramlens_core::errors::StorageError>(())
        })
        .unwrap();
}

#[test]
fn consumed_ids_are_stale_and_unknown_ids_are_not_found() {
    let (engine, seeded) = engine(&corpus("small_corpus"));
    let nom = seeded.id("subj_nom");
    let gen = seeded.id("subj_gen");
    engine
        .merge(vec![MergeOperation {
            sources: vec![gen],
            target: nom,
        }])
        .unwrap();

    let stale = engine
        .merge(vec![MergeOperation {
            sources: vec![gen],
            target: seeded.id("obj_acc"),
        }])
        .unwrap_err();
    assert!(matches!(
        stale,
        MergeError::StaleReference { pattern_id, merged_into } if pattern_id == gen && merged_into == nom
    ));

    let unknown = engine
        .merge(vec![MergeOperation {
            sources: vec![9_999],
            target: nom,
        }])
        .unwrap_err();
    assert!(matches!(unknown, MergeError::PatternNotFound { pattern_id: 9_999 }));
}

#[test]
fn deleting_a_source_cascades_to_its_examples_and_relations() {
    let (engine, seeded) = engine(&corpus("small_corpus"));
    let nom = seeded.id("subj_nom");
    engine
        .merge(vec![MergeOperation {
            sources: vec![nom],
            target: seeded.id("subj_gen"),
        }])
        .unwrap();

    engine
        .db()
        .with_reader(|conn| {
            assert!(examples::for_pattern(conn, nom, 10)?.is_empty());
            assert!(gramlens_storage::queries::relations::for_parent(conn, nom)?.is_empty());
            Ok::<_, gramlens_core::errors::StorageError>(())
        })
        .unwrap();
}

#[test]
fn review_falls_back_to_owned_ngrams() {
    let (db, seeded) = seeded_memory_store(&corpus("small_corpus"));
    let reviews = patterns_with_examples(&db, &[seeded.id("subj_nom"), seeded.id("subj_gen")], 5).unwrap();

    let stored: Vec<&str> = reviews[0].examples.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(stored, vec!["the dog runs home", "cats sleep all day"]);
    let fallback: Vec<&str> = reviews[1].examples.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(fallback, vec!["dogs run"]);
}

#[test]
fn lengths_available_for_merging_shrink_as_groups_settle() {
    let (engine, seeded) = engine(&corpus("small_corpus"));
    assert_eq!(engine.lengths_available_for_merging().unwrap(), vec![1, 2]);

    engine
        .merge(vec![MergeOperation {
            sources: vec![seeded.id("subj_gen")],
            target: seeded.id("subj_nom"),
        }])
        .unwrap();
    // subj_nom is now fully moderated; obj_acc is alone at length 2.
    assert_eq!(engine.lengths_available_for_merging().unwrap(), vec![1]);
}

#[test]
fn cancelled_token_stops_candidate_search() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    let token = CancellationToken::new();
    token.cancel();
    let scan = ScanContext::new(&db, token, Duration::from_secs(30));
    assert!(matches!(find_candidates(&scan, 2, 3), Err(AnalysisError::Cancelled)));
}

#[test]
fn exhausted_budget_stops_candidate_search() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    let scan = ScanContext::new(&db, CancellationToken::new(), Duration::ZERO);
    assert!(matches!(
        find_candidates(&scan, 2, 3),
        Err(AnalysisError::Timeout { timeout_ms: 0 })
    ));
}
