//! Filter model: positional blocks of rules, filter sets and block templates.

pub mod filter_set;
pub mod model;

pub use filter_set::FilterSet;
pub use model::{BlockId, BlockTemplate, FilterBlock, FilterModel, Rule, RuleId};
