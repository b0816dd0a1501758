//! Backend-neutral predicate tree compiled from a filter model.
//!
//! The tree is what the rest of the workspace consumes: the storage crate
//! renders it into parameterized SQL and [`Predicate::matches`] evaluates it
//! in memory with the same semantics.
//!
//! Nodes are built through the smart constructors ([`Predicate::all`],
//! [`Predicate::any`], [`Predicate::not`]) which flatten nested conjunctions
//! and fold constants. Two models that differ only by rules without values
//! therefore compile to identical trees.

pub mod compile;
pub mod eval;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::Feature;

pub use compile::{compile, compile_rule};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    Const(bool),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
    /// The ngram stores an entry for `feature` at `position`.
    HasPosition { feature: Feature, position: u32 },
    /// The scalar at `position` equals one of `values`.
    ValueIn {
        feature: Feature,
        position: u32,
        values: BTreeSet<String>,
    },
    /// The tag set at `position` shares at least one member with `values`.
    SetIntersects {
        feature: Feature,
        position: u32,
        values: BTreeSet<String>,
    },
    LengthIn(BTreeSet<u32>),
}

impl Predicate {
    /// Conjunction. Nested `All` nodes are inlined and `Const(true)` dropped;
    /// any `Const(false)` collapses the whole node.
    pub fn all<I: IntoIterator<Item = Predicate>>(parts: I) -> Self {
        let mut out = Vec::new();
        for part in parts {
            match part {
                Self::Const(true) => {}
                Self::Const(false) => return Self::Const(false),
                Self::All(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Self::Const(true),
            1 => out.remove(0),
            _ => Self::All(out),
        }
    }

    /// Disjunction, the dual of [`Predicate::all`].
    pub fn any<I: IntoIterator<Item = Predicate>>(parts: I) -> Self {
        let mut out = Vec::new();
        for part in parts {
            match part {
                Self::Const(false) => {}
                Self::Const(true) => return Self::Const(true),
                Self::Any(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Self::Const(false),
            1 => out.remove(0),
            _ => Self::Any(out),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Predicate) -> Self {
        match inner {
            Self::Const(b) => Self::Const(!b),
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(position: u32) -> Predicate {
        Predicate::HasPosition {
            feature: Feature::Pos,
            position,
        }
    }

    #[test]
    fn all_flattens_and_drops_true() {
        let p = Predicate::all([
            Predicate::Const(true),
            Predicate::all([has(0), has(1)]),
            has(2),
        ]);
        assert_eq!(p, Predicate::All(vec![has(0), has(1), has(2)]));
        assert_eq!(Predicate::all([Predicate::Const(true)]), Predicate::Const(true));
        assert_eq!(Predicate::all([has(0), Predicate::Const(false)]), Predicate::Const(false));
    }

    #[test]
    fn any_is_dual() {
        assert_eq!(Predicate::any(Vec::new()), Predicate::Const(false));
        assert_eq!(Predicate::any([has(0), Predicate::Const(true)]), Predicate::Const(true));
        assert_eq!(Predicate::any([Predicate::Const(false), has(1)]), has(1));
    }

    #[test]
    fn not_folds() {
        assert_eq!(Predicate::not(Predicate::Const(true)), Predicate::Const(false));
        assert_eq!(Predicate::not(Predicate::not(has(3))), has(3));
    }
}
