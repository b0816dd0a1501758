//! Immutable positional filter model.
//!
//! Every edit returns a new `FilterModel`; the receiver is never mutated.
//! Equality and hashing are structural, so a model can key a cache directly.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{FilterError, SignatureError};
use crate::signature::Blocks;
use crate::types::{Feature, Operator, SIGNATURE_FEATURES};

/// Opaque block identifier (uuid v4 text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

/// Opaque rule identifier (uuid v4 text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

impl_id!(BlockId);
impl_id!(RuleId);

/// One condition on a single dimension at its block's position.
/// A rule with no values is inactive.
///
/// A rule whose type name is unknown keeps that name so it is written back
/// unchanged; the compiler ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RuleRepr", into = "RuleRepr")]
pub struct Rule {
    pub id: RuleId,
    pub feature: Feature,
    pub operator: Operator,
    pub values: BTreeSet<String>,
    unrecognized_type: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct RuleRepr {
    id: RuleId,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    operator: Operator,
    #[serde(default)]
    values: BTreeSet<String>,
}

impl From<RuleRepr> for Rule {
    fn from(repr: RuleRepr) -> Self {
        let feature = repr
            .type_name
            .parse::<Feature>()
            .unwrap_or(Feature::Unrecognized);
        Self {
            id: repr.id,
            feature,
            operator: repr.operator,
            values: repr.values,
            unrecognized_type: (feature == Feature::Unrecognized).then_some(repr.type_name),
        }
    }
}

impl From<Rule> for RuleRepr {
    fn from(rule: Rule) -> Self {
        let type_name = match rule.unrecognized_type {
            Some(name) if rule.feature == Feature::Unrecognized => name,
            _ => rule.feature.as_str().to_string(),
        };
        Self {
            id: rule.id,
            type_name,
            operator: rule.operator,
            values: rule.values,
        }
    }
}

impl Rule {
    pub fn new(feature: Feature) -> Self {
        Self {
            id: RuleId::generate(),
            feature,
            operator: Operator::Include,
            values: BTreeSet::new(),
            unrecognized_type: None,
        }
    }

    pub fn with_values<I, S>(feature: Feature, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ..Self::new(feature)
        }
    }

    pub fn is_active(&self) -> bool {
        !self.values.is_empty()
    }

    /// The type name as written: the raw name for unknown types.
    pub fn type_name(&self) -> &str {
        match &self.unrecognized_type {
            Some(name) if self.feature == Feature::Unrecognized => name,
            _ => self.feature.as_str(),
        }
    }
}

/// Rules anchored at one 0-based token position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterBlock {
    pub id: BlockId,
    pub position: u32,
    pub rules: Vec<Rule>,
}

impl FilterBlock {
    fn rule_index(&self, rule_id: &RuleId) -> Result<usize, FilterError> {
        self.rules
            .iter()
            .position(|r| &r.id == rule_id)
            .ok_or_else(|| FilterError::RuleNotFound {
                block_id: self.id.to_string(),
                rule_id: rule_id.to_string(),
            })
    }
}

/// A reusable block without its identity. Applying a template to a block
/// keeps the target block's id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockTemplate {
    pub position: u32,
    pub rules: Vec<Rule>,
}

impl From<&FilterBlock> for BlockTemplate {
    fn from(block: &FilterBlock) -> Self {
        Self {
            position: block.position,
            rules: block.rules.clone(),
        }
    }
}

/// Ordered filter blocks. The default model matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterModel {
    blocks: Vec<FilterBlock>,
}

impl FilterModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<FilterBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[FilterBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<FilterBlock> {
        self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, block_id: &BlockId) -> Result<&FilterBlock, FilterError> {
        self.blocks
            .iter()
            .find(|b| &b.id == block_id)
            .ok_or_else(|| FilterError::BlockNotFound {
                block_id: block_id.to_string(),
            })
    }

    pub fn rule(&self, block_id: &BlockId, rule_id: &RuleId) -> Result<&Rule, FilterError> {
        let block = self.block(block_id)?;
        let idx = block.rule_index(rule_id)?;
        Ok(&block.rules[idx])
    }

    /// Append a block at `position` holding one empty include rule on `dep`.
    pub fn add_block(&self, position: u32) -> (Self, BlockId) {
        let id = BlockId::generate();
        let mut next = self.clone();
        next.blocks.push(FilterBlock {
            id: id.clone(),
            position,
            rules: vec![Rule::new(Feature::Dep)],
        });
        (next, id)
    }

    pub fn remove_block(&self, block_id: &BlockId) -> Result<Self, FilterError> {
        self.block(block_id)?;
        let mut next = self.clone();
        next.blocks.retain(|b| &b.id != block_id);
        Ok(next)
    }

    /// Append an empty include rule on `dep` to a block.
    pub fn add_rule(&self, block_id: &BlockId) -> Result<(Self, RuleId), FilterError> {
        let rule = Rule::new(Feature::Dep);
        let rule_id = rule.id.clone();
        let next = self.edit_block(block_id, |block| {
            block.rules.push(rule);
            Ok(())
        })?;
        Ok((next, rule_id))
    }

    pub fn remove_rule(&self, block_id: &BlockId, rule_id: &RuleId) -> Result<Self, FilterError> {
        self.edit_block(block_id, |block| {
            let idx = block.rule_index(rule_id)?;
            block.rules.remove(idx);
            Ok(())
        })
    }

    /// Change a rule's dimension. Values from the old dimension are cleared.
    pub fn set_rule_type(
        &self,
        block_id: &BlockId,
        rule_id: &RuleId,
        feature: Feature,
    ) -> Result<Self, FilterError> {
        self.edit_rule(block_id, rule_id, |rule| {
            if rule.feature != feature {
                rule.feature = feature;
                rule.unrecognized_type = None;
                rule.values.clear();
            }
        })
    }

    pub fn set_rule_operator(
        &self,
        block_id: &BlockId,
        rule_id: &RuleId,
        operator: Operator,
    ) -> Result<Self, FilterError> {
        self.edit_rule(block_id, rule_id, |rule| rule.operator = operator)
    }

    pub fn set_rule_values<I, S>(
        &self,
        block_id: &BlockId,
        rule_id: &RuleId,
        values: I,
    ) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        self.edit_rule(block_id, rule_id, move |rule| rule.values = values)
    }

    /// Move a block. A real move clears the values of every rule in it.
    pub fn set_block_position(&self, block_id: &BlockId, position: u32) -> Result<Self, FilterError> {
        self.edit_block(block_id, |block| {
            if block.position != position {
                block.position = position;
                for rule in &mut block.rules {
                    rule.values.clear();
                }
            }
            Ok(())
        })
    }

    /// Overwrite a block's position and rules from a template, keeping its id.
    pub fn replace_block(&self, block_id: &BlockId, template: &BlockTemplate) -> Result<Self, FilterError> {
        self.edit_block(block_id, |block| {
            block.position = template.position;
            block.rules = template.rules.clone();
            Ok(())
        })
    }

    /// Flip `value` in the first rule of `feature` at `position`, creating the
    /// block or rule when absent. Afterwards empty rules and empty blocks are
    /// dropped and blocks are ordered by position.
    pub fn toggle_value(&self, position: u32, feature: Feature, value: &str) -> Self {
        let mut next = self.clone();
        let rule = next.rule_at(position, feature);
        if !rule.values.remove(value) {
            rule.values.insert(value.to_string());
        }
        for block in &mut next.blocks {
            block.rules.retain(Rule::is_active);
        }
        next.blocks.retain(|b| !b.rules.is_empty());
        next.sort_blocks();
        next
    }

    /// Pin `values[i]` at position `i` for every `i`, adding to existing
    /// rules of `feature` rather than replacing them.
    pub fn fill_sequence<S: AsRef<str>>(&self, feature: Feature, values: &[S]) -> Self {
        let mut next = self.clone();
        for (position, value) in values.iter().enumerate() {
            let position = position as u32;
            next.rule_at(position, feature)
                .values
                .insert(value.as_ref().to_string());
        }
        next.sort_blocks();
        next
    }

    /// One block per position with `dep`, `pos` and `tag` include rules taken
    /// from a full pattern signature.
    pub fn from_signature(pattern_text: &str, length: usize) -> Result<Self, SignatureError> {
        let parsed = Blocks::parse_exact(pattern_text, length)?;
        let blocks = (0..length)
            .map(|i| FilterBlock {
                id: BlockId::generate(),
                position: i as u32,
                rules: SIGNATURE_FEATURES
                    .iter()
                    .map(|&feature| {
                        let value = match feature {
                            Feature::Dep => parsed.dep[i],
                            Feature::Pos => parsed.pos[i],
                            _ => parsed.tag[i],
                        };
                        Rule::with_values(feature, [value])
                    })
                    .collect(),
            })
            .collect();
        Ok(Self { blocks })
    }

    /// Drop blocks that cannot apply once the longest selected length is
    /// `max_len`.
    pub fn retain_positions_below(&self, max_len: u32) -> Self {
        let mut next = self.clone();
        next.blocks.retain(|b| b.position < max_len);
        next
    }

    /// The model restricted to rules with values; blocks left without rules
    /// are dropped.
    pub fn active(&self) -> Self {
        let blocks = self
            .blocks
            .iter()
            .filter_map(|b| {
                let rules: Vec<Rule> = b.rules.iter().filter(|r| r.is_active()).cloned().collect();
                (!rules.is_empty()).then(|| FilterBlock {
                    id: b.id.clone(),
                    position: b.position,
                    rules,
                })
            })
            .collect();
        Self { blocks }
    }

    /// Whether an active include rule already pins `feature` at `position`.
    pub fn pins(&self, position: u32, feature: Feature) -> bool {
        self.blocks
            .iter()
            .filter(|b| b.position == position)
            .flat_map(|b| b.rules.iter())
            .any(|r| r.feature == feature && r.operator == Operator::Include && r.is_active())
    }

    /// The first rule of `feature` at `position`, created (empty) together
    /// with its block when absent.
    fn rule_at(&mut self, position: u32, feature: Feature) -> &mut Rule {
        let block_idx = match self.blocks.iter().position(|b| b.position == position) {
            Some(idx) => idx,
            None => {
                self.blocks.push(FilterBlock {
                    id: BlockId::generate(),
                    position,
                    rules: Vec::new(),
                });
                self.blocks.len() - 1
            }
        };
        let block = &mut self.blocks[block_idx];
        let rule_idx = match block.rules.iter().position(|r| r.feature == feature) {
            Some(idx) => idx,
            None => {
                block.rules.push(Rule::new(feature));
                block.rules.len() - 1
            }
        };
        &mut block.rules[rule_idx]
    }

    fn sort_blocks(&mut self) {
        self.blocks.sort_by_key(|b| b.position);
    }

    fn edit_block<F>(&self, block_id: &BlockId, edit: F) -> Result<Self, FilterError>
    where
        F: FnOnce(&mut FilterBlock) -> Result<(), FilterError>,
    {
        let mut next = self.clone();
        let block = next
            .blocks
            .iter_mut()
            .find(|b| &b.id == block_id)
            .ok_or_else(|| FilterError::BlockNotFound {
                block_id: block_id.to_string(),
            })?;
        edit(block)?;
        Ok(next)
    }

    fn edit_rule<F>(&self, block_id: &BlockId, rule_id: &RuleId, edit: F) -> Result<Self, FilterError>
    where
        F: FnOnce(&mut Rule),
    {
        self.edit_block(block_id, |block| {
            let idx = block.rule_index(rule_id)?;
            edit(&mut block.rules[idx]);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_leave_the_receiver_untouched() {
        let empty = FilterModel::new();
        let (one, block_id) = empty.add_block(1);
        assert!(empty.is_empty());
        assert_eq!(one.blocks().len(), 1);
        assert_eq!(one.block(&block_id).unwrap().rules.len(), 1);
    }

    #[test]
    fn changing_rule_type_clears_values() {
        let (model, block_id) = FilterModel::new().add_block(0);
        let rule_id = model.block(&block_id).unwrap().rules[0].id.clone();
        let model = model.set_rule_values(&block_id, &rule_id, ["nsubj"]).unwrap();
        let same = model.set_rule_type(&block_id, &rule_id, Feature::Dep).unwrap();
        assert_eq!(same, model);
        let changed = model.set_rule_type(&block_id, &rule_id, Feature::Pos).unwrap();
        let rule = changed.rule(&block_id, &rule_id).unwrap();
        assert_eq!(rule.feature, Feature::Pos);
        assert!(rule.values.is_empty());
    }

    #[test]
    fn moving_a_block_clears_its_values() {
        let model = FilterModel::new().toggle_value(0, Feature::Pos, "NOUN");
        let block_id = model.blocks()[0].id.clone();
        let moved = model.set_block_position(&block_id, 2).unwrap();
        assert_eq!(moved.blocks()[0].position, 2);
        assert!(!moved.blocks()[0].rules[0].is_active());
    }

    #[test]
    fn missing_ids_are_errors() {
        let model = FilterModel::new();
        let err = model.remove_block(&BlockId::from("nope")).unwrap_err();
        assert!(matches!(err, FilterError::BlockNotFound { .. }));

        let (model, block_id) = model.add_block(0);
        let err = model.remove_rule(&block_id, &RuleId::from("nope")).unwrap_err();
        assert!(matches!(err, FilterError::RuleNotFound { .. }));
    }

    #[test]
    fn toggle_creates_then_removes() {
        let model = FilterModel::new()
            .toggle_value(2, Feature::Tag, "Nom")
            .toggle_value(0, Feature::Pos, "ADJ");
        assert_eq!(
            model.blocks().iter().map(|b| b.position).collect::<Vec<_>>(),
            vec![0, 2]
        );
        let model = model.toggle_value(2, Feature::Tag, "Nom");
        assert_eq!(model.blocks().len(), 1);
        assert_eq!(model.blocks()[0].position, 0);
    }

    #[test]
    fn toggle_drops_empty_rules_in_existing_blocks() {
        let (model, _) = FilterModel::new().add_block(0);
        let model = model.toggle_value(0, Feature::Pos, "NOUN");
        let block = &model.blocks()[0];
        assert_eq!(block.rules.len(), 1);
        assert_eq!(block.rules[0].feature, Feature::Pos);
    }

    #[test]
    fn fill_sequence_extends_existing_rules() {
        let model = FilterModel::new()
            .toggle_value(1, Feature::Pos, "NOUN")
            .fill_sequence(Feature::Pos, &["ADJ", "VERB"]);
        assert_eq!(model.blocks().len(), 2);
        let values: Vec<_> = model.blocks()[1].rules[0].values.iter().cloned().collect();
        assert_eq!(values, vec!["NOUN".to_string(), "VERB".to_string()]);
    }

    #[test]
    fn from_signature_pins_every_slot() {
        let model = FilterModel::from_signature("nsubj_ROOT_NOUN_VERB_Nom_Act", 2).unwrap();
        assert_eq!(model.blocks().len(), 2);
        assert!(model.pins(0, Feature::Dep));
        assert!(model.pins(1, Feature::Tag));
        assert!(FilterModel::from_signature("a_b", 2).is_err());
    }

    #[test]
    fn active_and_pins_ignore_empty_rules() {
        let (model, block_id) = FilterModel::new().add_block(0);
        assert!(!model.pins(0, Feature::Dep));
        assert!(model.active().is_empty());
        let rule_id = model.block(&block_id).unwrap().rules[0].id.clone();
        let model = model
            .set_rule_values(&block_id, &rule_id, ["det"])
            .unwrap()
            .set_rule_operator(&block_id, &rule_id, Operator::Exclude)
            .unwrap();
        assert!(!model.pins(0, Feature::Dep));
        assert_eq!(model.active().blocks().len(), 1);
    }

    #[test]
    fn retain_positions_below_drops_out_of_range_blocks() {
        let model = FilterModel::new()
            .toggle_value(0, Feature::Pos, "ADJ")
            .toggle_value(3, Feature::Pos, "NOUN");
        assert_eq!(model.retain_positions_below(3).blocks().len(), 1);
    }
}
