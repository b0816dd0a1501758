//! # gramlens-analysis
//!
//! The read and write paths analysts drive: faceted suggestions, phrase
//! search, the merge candidate finder and executor, and the
//! decomposition/construction lookup. [`GramlensEngine`] bundles them over
//! one store and one resolved configuration; [`AnalysisSession`] adds a
//! per-session subset and facet cache.

pub mod construction;
pub mod engine;
pub mod facets;
pub mod library;
pub mod merge;
pub mod phrases;
pub mod scan;
pub mod session;

pub use engine::GramlensEngine;
pub use scan::ScanContext;
pub use session::AnalysisSession;
