//! Structured span field names shared across gramlens subsystems.

/// Facets: wall time of one (position, dimension) aggregation in milliseconds.
pub const FACET_QUERY_TIME: &str = "facet_query_time_ms";

/// Facets: number of (position, dimension) tasks fanned out.
pub const FACET_TASKS: &str = "facet_tasks";

/// Candidates: number of slot subsets evaluated at a level.
pub const CANDIDATE_SUBSETS: &str = "candidate_subsets";

/// Candidates: level at which a group was found.
pub const DIFFERENCE_LEVEL: &str = "difference_level";

/// Merge: operations in a committed batch.
pub const MERGE_OPERATIONS: &str = "merge_operations";

/// Merge: ngrams reassigned by a batch.
pub const NGRAMS_REASSIGNED: &str = "ngrams_reassigned";

/// Session: materialized subset rebuild time in milliseconds.
pub const SUBSET_BUILD_TIME: &str = "subset_build_time_ms";

/// Session: facet cache hit rate (0.0 - 1.0).
pub const CACHE_HIT_RATE: &str = "cache_hit_rate";
