//! Patterns, their moderation state, examples and decomposition relations.

use serde::{Deserialize, Serialize};

use super::Feature;

/// Per-dimension review flags. A set flag means differences in that
/// dimension were already merged or explicitly skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Moderation {
    pub dep: bool,
    pub pos: bool,
    pub tag: bool,
}

impl Moderation {
    pub fn all() -> Self {
        Self {
            dep: true,
            pos: true,
            tag: true,
        }
    }

    /// Flag for one signature dimension; other dimensions are never moderated.
    pub fn is_moderated(&self, feature: Feature) -> bool {
        match feature {
            Feature::Dep => self.dep,
            Feature::Pos => self.pos,
            Feature::Tag => self.tag,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: i64,
    pub pattern_text: String,
    pub phrase_length: u32,
    pub total_frequency: f64,
    pub total_quantity: i64,
    pub relaxed_signature: String,
    pub moderation: Moderation,
    pub merged: bool,
    pub difference_level: u32,
}

/// The slice of a pattern shown next to lookups and review screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub id: i64,
    pub pattern_text: String,
    pub phrase_length: u32,
    pub total_frequency: f64,
    pub total_quantity: i64,
}

impl From<&Pattern> for PatternSummary {
    fn from(p: &Pattern) -> Self {
        Self {
            id: p.id,
            pattern_text: p.pattern_text.clone(),
            phrase_length: p.phrase_length,
            total_frequency: p.total_frequency,
            total_quantity: p.total_quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternExample {
    pub pattern_id: i64,
    pub example_text: String,
    pub example_frequency: f64,
}

/// One precomputed way to split a parent pattern into two relaxed children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternRelation {
    pub parent_pattern_id: i64,
    pub child_1_relaxed_signature: String,
    pub child_2_relaxed_signature: String,
    pub split_position: u32,
}
