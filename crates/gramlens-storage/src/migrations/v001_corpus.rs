//! V001 migration: corpus tables.
//!
//! Per-token annotation arrays are stored as JSON text and addressed with
//! `json_extract(col, '$[i]')` / `json_each`.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS unique_patterns (
    id INTEGER PRIMARY KEY,
    pattern_text TEXT NOT NULL UNIQUE,
    phrase_length INTEGER NOT NULL,
    total_frequency REAL NOT NULL DEFAULT 0,
    total_quantity INTEGER NOT NULL DEFAULT 0,
    relaxed_signature TEXT NOT NULL,
    moderated_dep INTEGER NOT NULL DEFAULT 0,
    moderated_pos INTEGER NOT NULL DEFAULT 0,
    moderated_tag INTEGER NOT NULL DEFAULT 0,
    merged INTEGER NOT NULL DEFAULT 0,
    difference_level INTEGER NOT NULL DEFAULT 0
) STRICT;

CREATE INDEX IF NOT EXISTS idx_patterns_length ON unique_patterns(phrase_length);
CREATE INDEX IF NOT EXISTS idx_patterns_relaxed
    ON unique_patterns(relaxed_signature, total_frequency DESC);

CREATE TABLE IF NOT EXISTS ngrams (
    id INTEGER PRIMARY KEY,
    text TEXT NOT NULL,
    deps TEXT NOT NULL DEFAULT '[]',
    pos TEXT NOT NULL DEFAULT '[]',
    tags TEXT NOT NULL DEFAULT '[]',
    tokens TEXT NOT NULL DEFAULT '[]',
    lemmas TEXT NOT NULL DEFAULT '[]',
    morph TEXT NOT NULL DEFAULT '[]',
    freq_mln REAL NOT NULL DEFAULT 0,
    len INTEGER NOT NULL,
    pattern_id INTEGER REFERENCES unique_patterns(id) ON DELETE SET NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_ngrams_len ON ngrams(len);
CREATE INDEX IF NOT EXISTS idx_ngrams_pattern ON ngrams(pattern_id, freq_mln DESC);

CREATE TABLE IF NOT EXISTS pattern_examples (
    id INTEGER PRIMARY KEY,
    pattern_id INTEGER NOT NULL REFERENCES unique_patterns(id) ON DELETE CASCADE,
    example_text TEXT NOT NULL,
    example_frequency REAL NOT NULL DEFAULT 0
) STRICT;

CREATE INDEX IF NOT EXISTS idx_examples_pattern
    ON pattern_examples(pattern_id, example_frequency DESC);
"#;
