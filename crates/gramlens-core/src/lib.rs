//! # gramlens-core
//!
//! Foundation crate for the gramlens corpus explorer.
//! Pattern signature algebra, the immutable filter model, the predicate
//! compiler, domain types, errors, config, tracing and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod filter;
pub mod predicate;
pub mod signature;
pub mod tracing;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::GramlensConfig;
pub use errors::{GramlensError, GramlensResult};
pub use filter::{FilterBlock, FilterModel, FilterSet, Rule};
pub use predicate::Predicate;
pub use types::{Feature, Operator};
