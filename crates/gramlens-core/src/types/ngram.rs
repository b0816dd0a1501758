//! A stored token sequence with parallel annotation arrays.

use serde::{Deserialize, Serialize};

use super::Feature;
use crate::signature;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ngram {
    pub id: i64,
    pub text: String,
    pub deps: Vec<String>,
    pub pos: Vec<String>,
    pub tags: Vec<String>,
    pub tokens: Vec<String>,
    pub lemmas: Vec<String>,
    pub morph: Vec<Vec<String>>,
    pub freq_mln: f64,
    pub len: u32,
    pub pattern_id: Option<i64>,
}

impl Ngram {
    /// The scalar array for a dimension. `None` for `morph` and unrecognized.
    pub fn scalar(&self, feature: Feature) -> Option<&[String]> {
        match feature {
            Feature::Dep => Some(&self.deps),
            Feature::Pos => Some(&self.pos),
            Feature::Tag => Some(&self.tags),
            Feature::Token => Some(&self.tokens),
            Feature::Lemma => Some(&self.lemmas),
            Feature::Morph | Feature::Unrecognized => None,
        }
    }

    /// Number of entries stored for a dimension.
    pub fn feature_len(&self, feature: Feature) -> usize {
        match feature {
            Feature::Morph => self.morph.len(),
            other => self.scalar(other).map_or(0, <[String]>::len),
        }
    }

    /// The full dep/pos/tag signature this ngram realizes.
    pub fn signature(&self) -> String {
        signature::join(self.deps.iter().chain(self.pos.iter()).chain(self.tags.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn signature_lists_blocks_in_order() {
        let ngram = Ngram {
            id: 1,
            text: "dog runs".to_string(),
            deps: strings(&["nsubj", "ROOT"]),
            pos: strings(&["NOUN", "VERB"]),
            tags: strings(&["Nom", "Act"]),
            tokens: strings(&["dog", "runs"]),
            lemmas: strings(&["dog", "run"]),
            morph: vec![strings(&["Case=Nom"]), Vec::new()],
            freq_mln: 1.0,
            len: 2,
            pattern_id: None,
        };
        assert_eq!(ngram.signature(), "nsubj_ROOT_NOUN_VERB_Nom_Act");
        assert_eq!(ngram.feature_len(Feature::Morph), 2);
    }
}
