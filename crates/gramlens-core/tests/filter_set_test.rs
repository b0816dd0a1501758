//! Filter sets and block templates survive JSON unchanged.

use std::collections::BTreeSet;

use gramlens_core::filter::{BlockTemplate, FilterModel, FilterSet};
use gramlens_core::predicate::compile;
use gramlens_core::types::{Feature, Operator};

#[test]
fn filter_set_json_is_lossless() {
    let model = FilterModel::new()
        .toggle_value(0, Feature::Pos, "ADJ")
        .toggle_value(1, Feature::Morph, "Case=Nom")
        .toggle_value(1, Feature::Lemma, "house");
    let block = &model.blocks()[1];
    let rule = &block.rules[0];
    let model = model
        .set_rule_operator(&block.id, &rule.id, Operator::Exclude)
        .unwrap();
    let lengths: BTreeSet<u32> = [2, 3].into_iter().collect();

    let set = FilterSet::new(lengths, model.clone());
    let json = set.to_json().unwrap();
    let back = FilterSet::from_json(&json).unwrap();

    assert_eq!(back, set);
    assert_eq!(back.model(), model);
    assert!(json.contains("\"type\":\"morph\""));
    assert!(json.contains("\"operator\":\"exclude\""));
}

#[test]
fn template_replaces_block_but_keeps_id() {
    let source = FilterModel::new().toggle_value(2, Feature::Tag, "Gen");
    let template = BlockTemplate::from(&source.blocks()[0]);
    let template = BlockTemplate::from_json(&template.to_json().unwrap()).unwrap();

    let (target, block_id) = FilterModel::new().add_block(0);
    let replaced = target.replace_block(&block_id, &template).unwrap();
    let block = replaced.block(&block_id).unwrap();
    assert_eq!(block.position, 2);
    assert_eq!(block.rules, template.rules);
}

#[test]
fn unknown_rule_type_survives_a_save() {
    let json = r#"{"lengths":[2],"blocks":[{"id":"b1","position":0,"rules":[
        {"id":"r1","type":"syntax","operator":"exclude","values":["x"]},
        {"id":"r2","type":"pos","values":["NOUN"]}]}]}"#;
    let set = FilterSet::from_json(json).unwrap();
    let model = set.model();
    let rules = &model.blocks()[0].rules;
    assert_eq!(rules[0].feature, Feature::Unrecognized);
    assert_eq!(rules[0].type_name(), "syntax");
    assert_eq!(rules[1].type_name(), "pos");

    let back = set.to_json().unwrap();
    assert!(back.contains("\"type\":\"syntax\""));
    assert!(!back.contains("unrecognized"));
    assert_eq!(FilterSet::from_json(&back).unwrap(), set);

    let predicate = compile(&set.model(), &set.lengths, None);
    let pos_only = compile(
        &FilterModel::new().toggle_value(0, Feature::Pos, "NOUN"),
        &set.lengths,
        None,
    );
    assert_eq!(predicate, pos_only);
}
