//! Pattern consolidation: finding near-duplicate groups, reviewing them and
//! folding them together.

pub mod candidates;
pub mod executor;
pub mod plan;

pub use candidates::{
    find_candidates, lengths_available_for_merging, patterns_with_examples, skip_group,
    PatternReview, ReviewExample,
};
pub use executor::execute;
pub use plan::MergePlan;
