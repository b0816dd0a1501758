//! Analysis sessions: subset lifecycle, facet cache and rebuilds.

use std::collections::BTreeSet;
use std::sync::Arc;

use gramlens_analysis::GramlensEngine;
use gramlens_core::config::GramlensConfig;
use gramlens_core::filter::FilterModel;
use gramlens_core::traits::CancellationToken;
use gramlens_core::types::{Feature, MergeOperation};
use gramlens_storage::queries::subsets;
use test_fixtures::{corpus, seeded_memory_store, Seeded};

fn engine() -> (GramlensEngine, Seeded) {
    let (db, seeded) = seeded_memory_store(&corpus("small_corpus"));
    (
        GramlensEngine::with_store(Arc::new(db), GramlensConfig::default()),
        seeded,
    )
}

fn subset_tables(engine: &GramlensEngine) -> Vec<String> {
    engine.db().with_reader(|conn| subsets::list_subsets(conn)).unwrap()
}

#[test]
fn repeated_requests_hit_the_cache() {
    let (engine, _) = engine();
    let session = engine.session(BTreeSet::from([2])).unwrap();
    let token = CancellationToken::new();
    let model = FilterModel::new().toggle_value(0, Feature::Dep, "nsubj");

    let first = session.suggestions(&model, engine.thresholds(), &token).unwrap();
    let second = session.suggestions(&model, engine.thresholds(), &token).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(session.hit_rate(), 0.5);
}

#[test]
fn session_only_sees_its_lengths() {
    let (engine, _) = engine();
    let session = engine.session(BTreeSet::from([1])).unwrap();
    let token = CancellationToken::new();

    let rows = session.search(&FilterModel::new(), 0.0, None, &token).unwrap();
    assert!(rows.iter().all(|r| r.tokens.len() == 1));
    assert_eq!(rows.len(), 4);
    assert!(session
        .frequent_sequences(&FilterModel::new(), Feature::Pos, 2, 10, &token)
        .unwrap()
        .is_empty());
}

#[test]
fn merge_invalidates_cached_facets() {
    let (engine, seeded) = engine();
    let session = engine.session(BTreeSet::from([2])).unwrap();
    let token = CancellationToken::new();
    let model = FilterModel::new();

    let before = session.suggestions(&model, engine.thresholds(), &token).unwrap();
    assert!(before[&0].iter().any(|s| s.value == "Gen"));

    engine
        .merge(vec![MergeOperation {
            sources: vec![seeded.id("subj_gen")],
            target: seeded.id("subj_nom"),
        }])
        .unwrap();

    let after = session.suggestions(&model, engine.thresholds(), &token).unwrap();
    assert!(!after[&0].iter().any(|s| s.feature == Feature::Tag && s.value == "Gen"));
    let nom = after[&0]
        .iter()
        .find(|s| s.feature == Feature::Tag && s.value == "Nom")
        .unwrap();
    assert_eq!(nom.frequency, 20.0);
}

#[test]
fn sessions_own_separate_tables_and_clean_up() {
    let (engine, _) = engine();
    let a = engine.session(BTreeSet::from([1])).unwrap();
    let b = engine.session(BTreeSet::from([2])).unwrap();
    assert_ne!(a.table(), b.table());
    assert_eq!(subset_tables(&engine).len(), 2);

    a.close().unwrap();
    assert_eq!(subset_tables(&engine), vec![b.table().to_string()]);

    drop(b);
    assert!(subset_tables(&engine).is_empty());
}

#[test]
fn rule_options_run_against_the_subset() {
    let (engine, _) = engine();
    let session = engine.session(BTreeSet::from([2])).unwrap();
    let model = FilterModel::new().toggle_value(1, Feature::Pos, "VERB");
    let block = &model.blocks()[0];

    let options = session
        .rule_options(
            &model,
            &block.id,
            &block.rules[0].id,
            engine.thresholds(),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].value, "VERB");
    assert_eq!(options[0].quantity, 4);
}
