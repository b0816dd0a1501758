//! Facet suggestions and rule options over the small corpus.

use std::collections::BTreeSet;
use std::time::Duration;

use gramlens_analysis::facets::{rule_options, suggestions};
use gramlens_analysis::ScanContext;
use gramlens_core::errors::AnalysisError;
use gramlens_core::filter::FilterModel;
use gramlens_core::traits::{Cancellable, CancellationToken};
use gramlens_core::types::{Feature, Thresholds};
use gramlens_storage::queries::subsets;
use gramlens_storage::sql::TableName;
use test_fixtures::{corpus, seeded_memory_store};

fn two() -> BTreeSet<u32> {
    BTreeSet::from([2])
}

#[test]
fn pinned_slot_is_not_offered_and_others_are_conditioned() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    let scan = ScanContext::new(&db, CancellationToken::new(), Duration::from_secs(30));
    let model = FilterModel::new().toggle_value(0, Feature::Dep, "nsubj");

    let map = suggestions(&scan, &model, &two(), Thresholds::default(), None).unwrap();
    let first = &map[&0];

    assert!(first.iter().all(|s| s.feature != Feature::Dep));
    for feature in [Feature::Pos, Feature::Tag, Feature::Morph] {
        assert!(first.iter().any(|s| s.feature == feature), "missing {feature}");
    }
    // obj_acc (1.5) does not satisfy dep[0]=nsubj.
    let noun = first
        .iter()
        .find(|s| s.feature == Feature::Pos && s.value == "NOUN")
        .unwrap();
    assert_eq!(noun.frequency, 20.0);
    assert_eq!(noun.quantity, 3);
    assert!(!first.iter().any(|s| s.value == "Acc"));

    // Unpinned position 1 offers dep.
    assert!(map[&1].iter().any(|s| s.feature == Feature::Dep && s.value == "ROOT"));
}

#[test]
fn lists_are_sorted_by_frequency_descending() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    let scan = ScanContext::new(&db, CancellationToken::new(), Duration::from_secs(30));

    let map = suggestions(&scan, &FilterModel::new(), &BTreeSet::new(), Thresholds::default(), None)
        .unwrap();
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
    for list in map.values() {
        assert!(list.windows(2).all(|w| w[0].frequency >= w[1].frequency));
        let mut keys: Vec<(Feature, &str)> = list.iter().map(|s| (s.feature, s.value.as_str())).collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }
}

#[test]
fn thresholds_apply_to_aggregates() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    let scan = ScanContext::new(&db, CancellationToken::new(), Duration::from_secs(30));
    let thresholds = Thresholds {
        min_frequency: 4.0,
        min_quantity: 2,
    };

    let map = suggestions(&scan, &FilterModel::new(), &two(), thresholds, None).unwrap();
    for list in map.values() {
        assert!(list.iter().all(|s| s.frequency >= 4.0 && s.quantity >= 2));
    }
    // Nom: 12 + 5 over two rows passes; Gen (3.0, one row) does not.
    assert!(map[&0].iter().any(|s| s.value == "Nom"));
    assert!(!map[&0].iter().any(|s| s.value == "Gen"));
}

#[test]
fn max_positions_caps_the_scan() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    let scan = ScanContext::new(&db, CancellationToken::new(), Duration::from_secs(30));
    let map = suggestions(&scan, &FilterModel::new(), &two(), Thresholds::default(), Some(1)).unwrap();
    assert_eq!(map.len(), 1);
}

#[test]
fn rule_options_ignore_the_rule_itself() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    let scan = ScanContext::new(&db, CancellationToken::new(), Duration::from_secs(30));
    let model = FilterModel::new()
        .toggle_value(0, Feature::Dep, "nsubj")
        .toggle_value(1, Feature::Lemma, "runs");
    let block = model.blocks()[0].clone();
    let rule = block.rules[0].clone();

    let options = rule_options(&scan, &model, &block.id, &rule.id, &two(), Thresholds::default()).unwrap();
    let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
    // Only "dog runs" has lemma "runs" at position 1.
    assert_eq!(values, vec!["nsubj"]);

    let lemma_block = model.blocks()[1].clone();
    let lemma_rule = lemma_block.rules[0].clone();
    let lemmas = rule_options(&scan, &model, &lemma_block.id, &lemma_rule.id, &two(), Thresholds::default())
        .unwrap();
    let values: Vec<&str> = lemmas.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(values, vec!["runs", "sleep", "run"]);
}

#[test]
fn positions_follow_the_scanned_table() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    let table = TableName::new("subset_unigrams").unwrap();
    db.with_writer(|conn| subsets::create_subset(conn, &table, &BTreeSet::from([1])))
        .unwrap();
    let scan = ScanContext::new(&db, CancellationToken::new(), Duration::from_secs(30))
        .with_table(table);

    let map = suggestions(&scan, &FilterModel::new(), &BTreeSet::new(), Thresholds::default(), None)
        .unwrap();
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![0]);
    assert!(map[&0].iter().any(|s| s.feature == Feature::Pos && s.value == "VERB"));
}

#[test]
fn cancelled_token_stops_facets() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    let token = CancellationToken::new();
    token.cancel();
    let scan = ScanContext::new(&db, token, Duration::from_secs(30));
    let result = suggestions(&scan, &FilterModel::new(), &two(), Thresholds::default(), None);
    assert!(matches!(result, Err(AnalysisError::Cancelled)));
}

#[test]
fn exhausted_budget_reports_timeout() {
    let (db, _) = seeded_memory_store(&corpus("small_corpus"));
    let scan = ScanContext::new(&db, CancellationToken::new(), Duration::ZERO);
    let result = suggestions(&scan, &FilterModel::new(), &two(), Thresholds::default(), None);
    assert!(matches!(result, Err(AnalysisError::Timeout { timeout_ms: 0 })));
}
