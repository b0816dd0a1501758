//! Corpus fixtures for gramlens integration tests.
//!
//! [`CorpusBuilder`] seeds a store programmatically; [`load_fixture`] reads
//! the JSON corpora under `data/`. Both panic on failure: they are only
//! meant for tests.

use std::collections::HashMap;
use std::path::PathBuf;

use gramlens_core::signature::Blocks;
use gramlens_core::types::{Ngram, PatternRelation};
use gramlens_storage::queries::{examples, ngrams, patterns, relations};
use gramlens_storage::DatabaseManager;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Directory holding the JSON fixtures of this crate.
pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatternFixture {
    pub key: String,
    pub text: String,
    pub length: u32,
}

/// An ngram realizing a pattern. Missing annotations are derived from the
/// pattern signature and the phrase text.
#[derive(Debug, Clone, Deserialize)]
pub struct NgramFixture {
    pub pattern: Option<String>,
    pub text: String,
    pub freq: f64,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub lemmas: Option<Vec<String>>,
    #[serde(default)]
    pub morph: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationFixture {
    pub parent: String,
    pub child_1: String,
    pub child_2: String,
    pub split: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExampleFixture {
    pub pattern: String,
    pub text: String,
    pub freq: f64,
}

/// A whole corpus as stored in `data/*.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorpusFixture {
    #[serde(default)]
    pub patterns: Vec<PatternFixture>,
    #[serde(default)]
    pub ngrams: Vec<NgramFixture>,
    #[serde(default)]
    pub relations: Vec<RelationFixture>,
    #[serde(default)]
    pub examples: Vec<ExampleFixture>,
}

/// Ids assigned while seeding, by fixture key.
#[derive(Debug, Clone, Default)]
pub struct Seeded {
    pub patterns: HashMap<String, i64>,
    pub ngrams: Vec<i64>,
}

impl Seeded {
    /// # Panics
    /// Panics on an unknown key.
    pub fn id(&self, key: &str) -> i64 {
        *self
            .patterns
            .get(key)
            .unwrap_or_else(|| panic!("no pattern seeded under key {key}"))
    }
}

/// Programmatic corpus builder.
#[derive(Debug, Clone, Default)]
pub struct CorpusBuilder {
    fixture: CorpusFixture,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: CorpusFixture) -> Self {
        Self { fixture }
    }

    pub fn pattern(mut self, key: &str, text: &str, length: u32) -> Self {
        self.fixture.patterns.push(PatternFixture {
            key: key.to_string(),
            text: text.to_string(),
            length,
        });
        self
    }

    /// An ngram of pattern `key` with annotations copied from its signature.
    pub fn ngram(mut self, key: &str, text: &str, freq: f64) -> Self {
        self.fixture.ngrams.push(NgramFixture {
            pattern: Some(key.to_string()),
            text: text.to_string(),
            freq,
            signature: None,
            lemmas: None,
            morph: None,
        });
        self
    }

    /// An ngram with its own signature (possibly differing from its
    /// pattern's) and explicit morphology.
    pub fn ngram_with(
        mut self,
        key: Option<&str>,
        text: &str,
        freq: f64,
        signature: &str,
        morph: Vec<Vec<String>>,
    ) -> Self {
        self.fixture.ngrams.push(NgramFixture {
            pattern: key.map(str::to_string),
            text: text.to_string(),
            freq,
            signature: Some(signature.to_string()),
            lemmas: None,
            morph: Some(morph),
        });
        self
    }

    pub fn relation(mut self, parent: &str, child_1: &str, child_2: &str, split: u32) -> Self {
        self.fixture.relations.push(RelationFixture {
            parent: parent.to_string(),
            child_1: child_1.to_string(),
            child_2: child_2.to_string(),
            split,
        });
        self
    }

    pub fn example(mut self, key: &str, text: &str, freq: f64) -> Self {
        self.fixture.examples.push(ExampleFixture {
            pattern: key.to_string(),
            text: text.to_string(),
            freq,
        });
        self
    }

    /// Write everything into `db` and recompute pattern aggregates.
    ///
    /// # Panics
    /// Panics on any storage failure or unknown key.
    pub fn seed(&self, db: &DatabaseManager) -> Seeded {
        let fixture = &self.fixture;
        db.with_writer(|conn| -> Result<Seeded, gramlens_core::errors::StorageError> {
            let mut seeded = Seeded::default();
            let mut lengths = HashMap::new();
            let mut signatures = HashMap::new();
            for p in &fixture.patterns {
                let id = patterns::insert(conn, &p.text, p.length)?;
                seeded.patterns.insert(p.key.clone(), id);
                lengths.insert(p.key.clone(), p.length);
                signatures.insert(p.key.clone(), p.text.clone());
            }
            for n in &fixture.ngrams {
                let tokens: Vec<String> = n.text.split_whitespace().map(str::to_string).collect();
                let len = tokens.len();
                let signature = n
                    .signature
                    .clone()
                    .or_else(|| n.pattern.as_ref().and_then(|k| signatures.get(k).cloned()))
                    .unwrap_or_default();
                let blocks = Blocks::parse(&signature, len);
                let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
                let ngram = Ngram {
                    id: 0,
                    text: n.text.clone(),
                    deps: owned(&blocks.dep),
                    pos: owned(&blocks.pos),
                    tags: owned(&blocks.tag),
                    lemmas: n
                        .lemmas
                        .clone()
                        .unwrap_or_else(|| tokens.iter().map(|t| t.to_lowercase()).collect()),
                    morph: n
                        .morph
                        .clone()
                        .unwrap_or_else(|| blocks.tag.iter().map(|t| vec![format!("Tag={t}")]).collect()),
                    tokens,
                    freq_mln: n.freq,
                    len: len as u32,
                    pattern_id: n.pattern.as_ref().map(|k| seeded.id(k)),
                };
                seeded.ngrams.push(ngrams::insert(conn, &ngram)?);
            }
            for r in &fixture.relations {
                let child = |key: &str| {
                    let sig = signatures
                        .get(key)
                        .unwrap_or_else(|| panic!("no pattern seeded under key {key}"));
                    gramlens_core::signature::relax(sig, lengths[key] as usize)
                };
                relations::insert(
                    conn,
                    &PatternRelation {
                        parent_pattern_id: seeded.id(&r.parent),
                        child_1_relaxed_signature: child(&r.child_1),
                        child_2_relaxed_signature: child(&r.child_2),
                        split_position: r.split,
                    },
                )?;
            }
            for e in &fixture.examples {
                examples::insert(conn, seeded.id(&e.pattern), &e.text, e.freq)?;
            }
            for id in seeded.patterns.values() {
                patterns::recompute_aggregates(conn, *id)?;
            }
            Ok(seeded)
        })
        .unwrap_or_else(|e| panic!("failed to seed corpus: {e}"))
    }
}

/// An in-memory store seeded with `builder`.
pub fn seeded_memory_store(builder: &CorpusBuilder) -> (DatabaseManager, Seeded) {
    let db = DatabaseManager::open_in_memory().expect("open in-memory store");
    let seeded = builder.seed(&db);
    (db, seeded)
}

/// Load `data/<name>.json` into a builder.
pub fn corpus(name: &str) -> CorpusBuilder {
    CorpusBuilder::from_fixture(load_fixture(&format!("{name}.json")))
}
