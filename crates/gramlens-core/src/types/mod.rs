//! Domain types shared by every gramlens crate.

pub mod feature;
pub mod merge;
pub mod ngram;
pub mod pattern;
pub mod suggestion;

pub use feature::{Feature, Operator, FACET_FEATURES, SIGNATURE_FEATURES};
pub use merge::{MergeCandidateGroup, MergeOperation, MergeOutcome, SlotRef};
pub use ngram::Ngram;
pub use pattern::{Moderation, Pattern, PatternExample, PatternRelation, PatternSummary};
pub use suggestion::{FacetValue, Suggestion, SuggestionMap, Thresholds};
