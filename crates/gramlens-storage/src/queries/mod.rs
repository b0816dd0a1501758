//! One module per table (or table family). Every function takes a
//! `&Connection` so callers choose the reader, the writer or a transaction.

pub mod aggregates;
pub mod examples;
pub mod merge_history;
pub mod meta;
pub mod ngrams;
pub mod patterns;
pub mod phrases;
pub mod relations;
pub mod saved_filters;
pub mod subsets;
