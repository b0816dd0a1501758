//! Serializable filter sets and block templates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{BlockTemplate, FilterBlock, FilterModel};
use crate::errors::FilterError;

/// Selected phrase lengths plus the filter blocks applied to them.
/// This is the shape saved under a name and restored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub lengths: BTreeSet<u32>,
    #[serde(default)]
    pub blocks: Vec<FilterBlock>,
}

impl FilterSet {
    pub fn new(lengths: BTreeSet<u32>, model: FilterModel) -> Self {
        Self {
            lengths,
            blocks: model.into_blocks(),
        }
    }

    pub fn model(&self) -> FilterModel {
        FilterModel::from_blocks(self.blocks.clone())
    }

    pub fn to_json(&self) -> Result<String, FilterError> {
        encode(self)
    }

    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        decode(json)
    }
}

impl BlockTemplate {
    pub fn to_json(&self) -> Result<String, FilterError> {
        encode(self)
    }

    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        decode(json)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, FilterError> {
    serde_json::to_string(value).map_err(|e| FilterError::Decode {
        message: e.to_string(),
    })
}

fn decode<T: for<'de> Deserialize<'de>>(json: &str) -> Result<T, FilterError> {
    serde_json::from_str(json).map_err(|e| FilterError::Decode {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Feature;

    #[test]
    fn rule_operator_defaults_to_include() {
        let json = r#"{"lengths":[2],"blocks":[{"id":"b","position":0,"rules":[{"id":"r","type":"pos","values":["NOUN"]}]}]}"#;
        let set = FilterSet::from_json(json).unwrap();
        assert!(set.model().pins(0, Feature::Pos));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        assert!(matches!(
            FilterSet::from_json("{\"blocks\": 3}"),
            Err(FilterError::Decode { .. })
        ));
    }
}
