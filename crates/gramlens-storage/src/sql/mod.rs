//! Predicate → parameterized SQL.

pub mod fragment;
pub mod render;

pub use fragment::{SqlFragment, TableName};
pub use render::{json_path, render_predicate};
