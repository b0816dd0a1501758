//! In-memory evaluation of a predicate against one ngram.

use super::Predicate;
use crate::types::{Feature, Ngram};

impl Predicate {
    /// Whether `ngram` satisfies the predicate. Agrees with the SQL rendering
    /// on every well-formed row.
    pub fn matches(&self, ngram: &Ngram) -> bool {
        match self {
            Self::Const(b) => *b,
            Self::All(parts) => parts.iter().all(|p| p.matches(ngram)),
            Self::Any(parts) => parts.iter().any(|p| p.matches(ngram)),
            Self::Not(inner) => !inner.matches(ngram),
            Self::HasPosition { feature, position } => {
                ngram.feature_len(*feature) > *position as usize
            }
            Self::ValueIn {
                feature,
                position,
                values,
            } => ngram
                .scalar(*feature)
                .and_then(|col| col.get(*position as usize))
                .is_some_and(|v| values.contains(v)),
            Self::SetIntersects {
                feature,
                position,
                values,
            } => {
                *feature == Feature::Morph
                    && ngram
                        .morph
                        .get(*position as usize)
                        .is_some_and(|tags| tags.iter().any(|t| values.contains(t)))
            }
            Self::LengthIn(lengths) => lengths.contains(&ngram.len),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::filter::{FilterModel, Rule};
    use crate::predicate::compile_rule;
    use crate::types::Operator;

    fn ngram() -> Ngram {
        Ngram {
            id: 1,
            text: "red house".into(),
            deps: vec!["amod".into(), "ROOT".into()],
            pos: vec!["ADJ".into(), "NOUN".into()],
            tags: vec!["Pos".into(), "Nom".into()],
            tokens: vec!["red".into(), "house".into()],
            lemmas: vec!["red".into(), "house".into()],
            morph: vec![vec!["Degree=Pos".into()], vec!["Case=Nom".into(), "Number=Sing".into()]],
            freq_mln: 1.5,
            len: 2,
            pattern_id: Some(7),
        }
    }

    #[test]
    fn out_of_range_positions_never_match() {
        let include = Rule::with_values(Feature::Pos, ["NOUN"]);
        let mut exclude = include.clone();
        exclude.operator = Operator::Exclude;
        assert!(!compile_rule(5, &include).matches(&ngram()));
        assert!(!compile_rule(5, &exclude).matches(&ngram()));
    }

    #[test]
    fn morph_include_and_exclude() {
        let include = Rule::with_values(Feature::Morph, ["Case=Nom", "Case=Acc"]);
        let mut exclude = include.clone();
        exclude.operator = Operator::Exclude;
        assert!(compile_rule(1, &include).matches(&ngram()));
        assert!(!compile_rule(1, &exclude).matches(&ngram()));
        assert!(compile_rule(0, &exclude).matches(&ngram()));
    }

    #[test]
    fn compiled_model_filters_lengths_and_values() {
        let model = FilterModel::new().toggle_value(0, Feature::Lemma, "red");
        let two: BTreeSet<u32> = [2].into_iter().collect();
        let three: BTreeSet<u32> = [3].into_iter().collect();
        assert!(crate::predicate::compile(&model, &two, None).matches(&ngram()));
        assert!(!crate::predicate::compile(&model, &three, None).matches(&ngram()));
    }
}
