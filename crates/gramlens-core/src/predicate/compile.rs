//! Filter model → predicate tree.

use std::collections::BTreeSet;

use super::Predicate;
use crate::filter::{BlockId, FilterModel, Rule, RuleId};
use crate::types::{Feature, Operator};

/// Compile `model` restricted to `lengths` into a predicate.
///
/// `skip` names one rule to leave out, used when computing the options for
/// that rule itself. An empty `lengths` set adds no length constraint.
/// Rules with no values or an unrecognized type contribute nothing.
pub fn compile(
    model: &FilterModel,
    lengths: &BTreeSet<u32>,
    skip: Option<(&BlockId, &RuleId)>,
) -> Predicate {
    let length_clause = if lengths.is_empty() {
        Predicate::Const(true)
    } else {
        Predicate::LengthIn(lengths.clone())
    };

    let rule_clauses = model.blocks().iter().flat_map(|block| {
        block
            .rules
            .iter()
            .filter(move |rule| skip != Some((&block.id, &rule.id)))
            .map(move |rule| compile_rule(block.position, rule))
    });

    Predicate::all(std::iter::once(length_clause).chain(rule_clauses))
}

/// One rule at `position`, always guarded by a bounds check so that a rule
/// past the end of a short ngram never matches it.
pub fn compile_rule(position: u32, rule: &Rule) -> Predicate {
    if rule.values.is_empty() || rule.feature == Feature::Unrecognized {
        return Predicate::Const(true);
    }
    let feature = rule.feature;
    let values = rule.values.clone();
    let test = if feature.is_set_valued() {
        Predicate::SetIntersects {
            feature,
            position,
            values,
        }
    } else {
        Predicate::ValueIn {
            feature,
            position,
            values,
        }
    };
    let test = match rule.operator {
        Operator::Include => test,
        Operator::Exclude => Predicate::not(test),
    };
    Predicate::All(vec![Predicate::HasPosition { feature, position }, test])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(ls: &[u32]) -> BTreeSet<u32> {
        ls.iter().copied().collect()
    }

    #[test]
    fn empty_model_compiles_to_length_filter() {
        let p = compile(&FilterModel::new(), &lengths(&[2, 3]), None);
        assert_eq!(p, Predicate::LengthIn(lengths(&[2, 3])));
        assert_eq!(compile(&FilterModel::new(), &BTreeSet::new(), None), Predicate::Const(true));
    }

    #[test]
    fn exclude_negates_only_the_value_test() {
        let mut rule = Rule::with_values(Feature::Dep, ["det"]);
        rule.operator = Operator::Exclude;
        let p = compile_rule(1, &rule);
        let Predicate::All(parts) = p else {
            panic!("expected a conjunction")
        };
        assert_eq!(
            parts[0],
            Predicate::HasPosition {
                feature: Feature::Dep,
                position: 1
            }
        );
        assert!(matches!(parts[1], Predicate::Not(_)));
    }

    #[test]
    fn morph_rules_use_set_intersection() {
        let rule = Rule::with_values(Feature::Morph, ["Case=Nom"]);
        let Predicate::All(parts) = compile_rule(0, &rule) else {
            panic!("expected a conjunction")
        };
        assert!(matches!(parts[1], Predicate::SetIntersects { .. }));
    }

    #[test]
    fn unrecognized_rules_are_dropped() {
        let rule = Rule::with_values(Feature::Unrecognized, ["x"]);
        assert_eq!(compile_rule(0, &rule), Predicate::Const(true));
    }

    #[test]
    fn skipping_a_rule_equals_clearing_it() {
        let model = FilterModel::new()
            .toggle_value(0, Feature::Pos, "ADJ")
            .toggle_value(1, Feature::Tag, "Nom");
        let block = &model.blocks()[1];
        let rule = &block.rules[0];
        let cleared = model
            .set_rule_values(&block.id, &rule.id, Vec::<String>::new())
            .unwrap();
        let ls = lengths(&[2]);
        assert_eq!(
            compile(&model, &ls, Some((&block.id, &rule.id))),
            compile(&cleared, &ls, None)
        );
    }
}
