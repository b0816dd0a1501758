//! Shared constants for the gramlens workspace.

/// gramlens version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Separator between the parts of a pattern signature.
pub const SIGNATURE_SEPARATOR: char = '_';

/// Number of blocks in a full signature: dep, pos, tag.
pub const SIGNATURE_BLOCKS: usize = 3;

/// Highest difference level the merge candidate finder will try.
pub const MAX_DIFFERENCE_LEVEL: usize = 3;

/// Default aggregate frequency threshold for facets (per million).
pub const DEFAULT_MIN_FREQUENCY: f64 = 0.0;

/// Default aggregate count threshold for facets.
pub const DEFAULT_MIN_QUANTITY: u64 = 0;

/// Default per-query timeout for facet and candidate scans.
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 30_000;

/// Default number of construction results returned per side.
pub const DEFAULT_CONSTRUCTION_TOP_K: usize = 50;

/// Default number of example phrases returned per pattern.
pub const DEFAULT_EXAMPLE_LIMIT: usize = 50;

/// Default limit for frequent sequence lookups.
pub const DEFAULT_SEQUENCE_LIMIT: usize = 100;

/// Longest phrase the frequent sequence lookup accepts.
pub const MAX_SEQUENCE_LENGTH: u32 = 10;

/// Read pool size for file-backed stores.
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// SQLite busy timeout.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Session facet cache capacity (entries).
pub const DEFAULT_SESSION_CACHE_CAPACITY: u64 = 512;

/// Session facet cache time-to-live.
pub const DEFAULT_SESSION_CACHE_TTL_SECS: u64 = 3_600;

/// SQLite VM instructions between progress-handler checks.
pub const INTERRUPT_CHECK_INTERVAL: i32 = 1_000;
