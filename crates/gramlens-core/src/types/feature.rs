//! Feature dimensions and rule operators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One per-token annotation dimension of an ngram.
///
/// Unknown names deserialize to `Unrecognized`; rules of that type are
/// dropped by the compiler instead of failing the whole filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Dep,
    Pos,
    Tag,
    Token,
    Lemma,
    Morph,
    #[serde(other)]
    Unrecognized,
}

/// The three dimensions that make up a pattern signature, in block order.
pub const SIGNATURE_FEATURES: [Feature; 3] = [Feature::Dep, Feature::Pos, Feature::Tag];

/// Dimensions offered as facets.
pub const FACET_FEATURES: [Feature; 4] = [Feature::Dep, Feature::Pos, Feature::Tag, Feature::Morph];

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dep => "dep",
            Self::Pos => "pos",
            Self::Tag => "tag",
            Self::Token => "token",
            Self::Lemma => "lemma",
            Self::Morph => "morph",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Corpus column holding this dimension, `None` for unrecognized types.
    pub fn column(&self) -> Option<&'static str> {
        match self {
            Self::Dep => Some("deps"),
            Self::Pos => Some("pos"),
            Self::Tag => Some("tags"),
            Self::Token => Some("tokens"),
            Self::Lemma => Some("lemmas"),
            Self::Morph => Some("morph"),
            Self::Unrecognized => None,
        }
    }

    /// `morph` holds a set of tags per token; everything else one string.
    pub fn is_set_valued(&self) -> bool {
        matches!(self, Self::Morph)
    }

    /// Index of this dimension's block inside a full signature.
    pub fn signature_block(&self) -> Option<usize> {
        match self {
            Self::Dep => Some(0),
            Self::Pos => Some(1),
            Self::Tag => Some(2),
            _ => None,
        }
    }

    /// How risky it is to fold patterns that differ in this dimension.
    /// Lower is safer: tag < pos < dep.
    pub fn merge_risk(&self) -> u8 {
        match self {
            Self::Tag => 0,
            Self::Pos => 1,
            Self::Dep => 2,
            _ => u8::MAX,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "dep" => Self::Dep,
            "pos" => Self::Pos,
            "tag" => Self::Tag,
            "token" => Self::Token,
            "lemma" => Self::Lemma,
            "morph" => Self::Morph,
            _ => Self::Unrecognized,
        })
    }
}

/// Whether a rule keeps or drops rows carrying one of its values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    #[default]
    Include,
    Exclude,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => f.write_str("include"),
            Self::Exclude => f.write_str("exclude"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_feature_names_are_unrecognized() {
        let f: Feature = serde_json::from_str("\"syntax\"").unwrap();
        assert_eq!(f, Feature::Unrecognized);
        assert_eq!("lemma".parse::<Feature>().unwrap(), Feature::Lemma);
        assert!(Feature::Unrecognized.column().is_none());
    }

    #[test]
    fn risk_orders_tag_before_pos_before_dep() {
        assert!(Feature::Tag.merge_risk() < Feature::Pos.merge_risk());
        assert!(Feature::Pos.merge_risk() < Feature::Dep.merge_risk());
    }
}
