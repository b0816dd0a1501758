//! V004 migration: merge log and corpus metadata.
//!
//! `merge_history` keeps one row per consumed source pattern so a later
//! reference to it can be reported as stale. `corpus_meta.generation` is
//! bumped by every committed merge batch and invalidates session caches.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS merge_history (
    id INTEGER PRIMARY KEY,
    batch_id TEXT NOT NULL,
    source_id INTEGER NOT NULL,
    target_id INTEGER NOT NULL,
    merged_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_merge_history_source ON merge_history(source_id);
CREATE INDEX IF NOT EXISTS idx_merge_history_batch ON merge_history(batch_id);

CREATE TABLE IF NOT EXISTS corpus_meta (
    key TEXT PRIMARY KEY,
    value INTEGER NOT NULL
) STRICT;

INSERT OR IGNORE INTO corpus_meta (key, value) VALUES ('generation', 0);
"#;
