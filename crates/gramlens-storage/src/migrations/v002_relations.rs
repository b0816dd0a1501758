//! V002 migration: precomputed relaxed decompositions of patterns.
//! Append-only; rows go away only when their parent is deleted.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS pattern_relations_relaxed (
    id INTEGER PRIMARY KEY,
    parent_pattern_id INTEGER NOT NULL REFERENCES unique_patterns(id) ON DELETE CASCADE,
    child_1_relaxed_signature TEXT NOT NULL,
    child_2_relaxed_signature TEXT NOT NULL,
    split_position INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_relations_parent ON pattern_relations_relaxed(parent_pattern_id);
CREATE INDEX IF NOT EXISTS idx_relations_child_1 ON pattern_relations_relaxed(child_1_relaxed_signature);
CREATE INDEX IF NOT EXISTS idx_relations_child_2 ON pattern_relations_relaxed(child_2_relaxed_signature);
"#;
