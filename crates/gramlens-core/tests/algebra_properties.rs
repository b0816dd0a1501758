//! Property tests for the signature algebra and the predicate compiler.

use std::collections::BTreeSet;

use proptest::prelude::*;

use gramlens_core::filter::FilterModel;
use gramlens_core::predicate::compile;
use gramlens_core::signature::{glue, relax, split};
use gramlens_core::types::{Feature, Operator};

fn part() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,6}"
}

/// A full signature of the given length.
fn signature(length: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(part(), 3 * length).prop_map(|parts| parts.join("_"))
}

fn sized_signature() -> impl Strategy<Value = (String, usize)> {
    (1usize..6).prop_flat_map(|n| (signature(n), Just(n)))
}

fn feature() -> impl Strategy<Value = Feature> {
    prop_oneof![
        Just(Feature::Dep),
        Just(Feature::Pos),
        Just(Feature::Tag),
        Just(Feature::Token),
        Just(Feature::Lemma),
        Just(Feature::Morph),
    ]
}

/// Models built by toggling values, with a random operator per rule.
fn model() -> impl Strategy<Value = FilterModel> {
    prop::collection::vec((0u32..4, feature(), part(), any::<bool>()), 1..8).prop_map(|edits| {
        let mut model = FilterModel::new();
        for (position, feature, value, _) in &edits {
            model = model.toggle_value(*position, *feature, value);
        }
        for (position, feature, _, exclude) in edits {
            let target = model
                .blocks()
                .iter()
                .find(|b| b.position == position)
                .and_then(|b| b.rules.iter().find(|r| r.feature == feature).map(|r| (b.id.clone(), r.id.clone())));
            if let (Some((block_id, rule_id)), true) = (target, exclude) {
                model = model
                    .set_rule_operator(&block_id, &rule_id, Operator::Exclude)
                    .unwrap();
            }
        }
        model
    })
}

proptest! {
    #[test]
    fn split_undoes_glue((a, la) in sized_signature(), (b, lb) in sized_signature()) {
        let glued = glue(&a, la, &b, lb);
        let (left, right) = split(&glued, la + lb, la).unwrap();
        prop_assert_eq!(left, a);
        prop_assert_eq!(right, b);
    }

    #[test]
    fn relax_ignores_dependencies((sig, n) in sized_signature(), deps in prop::collection::vec(part(), 6)) {
        let mut parts: Vec<String> = sig.split('_').map(str::to_string).collect();
        for (slot, dep) in parts.iter_mut().take(n).zip(deps) {
            *slot = dep;
        }
        prop_assert_eq!(relax(&parts.join("_"), n), relax(&sig, n));
    }

    #[test]
    fn skip_equals_cleared_rule(model in model(), pick in any::<prop::sample::Index>()) {
        let targets: Vec<_> = model
            .blocks()
            .iter()
            .flat_map(|b| b.rules.iter().map(move |r| (b.id.clone(), r.id.clone())))
            .collect();
        prop_assume!(!targets.is_empty());
        let (block_id, rule_id) = &targets[pick.index(targets.len())];
        let cleared = model
            .set_rule_values(block_id, rule_id, Vec::<String>::new())
            .unwrap();
        let lengths: BTreeSet<u32> = [2, 4].into_iter().collect();
        prop_assert_eq!(
            compile(&model, &lengths, Some((block_id, rule_id))),
            compile(&cleared, &lengths, None)
        );
    }

    #[test]
    fn empty_rules_are_neutral(model in model(), position in 0u32..4) {
        let (with_empty, _) = model.add_block(position);
        let lengths: BTreeSet<u32> = [3].into_iter().collect();
        prop_assert_eq!(compile(&with_empty, &lengths, None), compile(&model, &lengths, None));
    }
}
