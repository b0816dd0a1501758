//! V003 migration: named filter sets and block templates (JSON documents).

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS saved_filters (
    name TEXT PRIMARY KEY,
    filters_json TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;

CREATE TABLE IF NOT EXISTS saved_blocks (
    name TEXT PRIMARY KEY,
    block_json TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;
"#;
