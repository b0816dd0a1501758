//! Analysis sessions: a private corpus subset plus a facet cache.
//!
//! A session copies the ngrams of its selected lengths into its own table
//! and caches facet results keyed by (model, thresholds, corpus
//! generation). Both are disposable: when a merge bumps the generation the
//! subset is rebuilt and the cache emptied on next use. Sessions never share
//! tables or caches.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gramlens_core::config::GramlensConfig;
use gramlens_core::errors::{AnalysisError, StorageError};
use gramlens_core::filter::{BlockId, FilterModel, RuleId};
use gramlens_core::tracing::metrics;
use gramlens_core::traits::CancellationToken;
use gramlens_core::types::{FacetValue, Feature, SuggestionMap, Thresholds};
use gramlens_storage::queries::aggregates::SequenceRow;
use gramlens_storage::queries::phrases::PhraseRow;
use gramlens_storage::queries::{meta, subsets};
use gramlens_storage::sql::TableName;
use gramlens_storage::DatabaseManager;
use moka::sync::Cache;
use uuid::Uuid;

use crate::scan::ScanContext;
use crate::{facets, phrases};

type FacetKey = (FilterModel, (u64, u64), u64);

/// One analyst's view of the corpus restricted to a set of lengths.
pub struct AnalysisSession {
    id: Uuid,
    db: Arc<DatabaseManager>,
    lengths: BTreeSet<u32>,
    table: TableName,
    /// Generation the subset was built at; `None` before the first build.
    built_at: Mutex<Option<u64>>,
    cache: Cache<FacetKey, Arc<SuggestionMap>>,
    hits: AtomicU64,
    misses: AtomicU64,
    timeout: Duration,
    max_positions: Option<u32>,
    closed: bool,
}

impl AnalysisSession {
    /// Create the session and materialize its subset.
    pub fn open(
        db: Arc<DatabaseManager>,
        lengths: BTreeSet<u32>,
        config: &GramlensConfig,
    ) -> Result<Self, AnalysisError> {
        let id = Uuid::new_v4();
        let table = TableName::new(&format!("subset_{}", id.simple())).ok_or_else(|| {
            StorageError::SqliteError {
                message: format!("invalid subset table name for session {id}"),
            }
        })?;
        let cache = Cache::builder()
            .max_capacity(config.session.effective_cache_capacity())
            .time_to_live(config.session.effective_cache_ttl())
            .build();
        let session = Self {
            id,
            db,
            lengths,
            table,
            built_at: Mutex::new(None),
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            timeout: Duration::from_millis(config.facets.effective_timeout_ms()),
            max_positions: config.facets.max_positions,
            closed: false,
        };
        session.refresh()?;
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lengths(&self) -> &BTreeSet<u32> {
        &self.lengths
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Rebuild the subset and drop cached facets if the corpus changed since
    /// the last build. Returns the current generation.
    pub fn refresh(&self) -> Result<u64, AnalysisError> {
        let generation = self.db.with_reader(|conn| meta::generation(conn))?;
        let mut built_at = self.built_at.lock().map_err(|_| StorageError::SqliteError {
            message: "session lock poisoned".to_string(),
        })?;
        if *built_at == Some(generation) {
            return Ok(generation);
        }
        let started = Instant::now();
        let rows = self
            .db
            .with_writer(|conn| subsets::create_subset(conn, &self.table, &self.lengths))?;
        self.cache.invalidate_all();
        *built_at = Some(generation);
        tracing::info!(
            session = %self.id,
            generation,
            rows,
            { metrics::SUBSET_BUILD_TIME } = started.elapsed().as_millis() as u64,
            "session subset built"
        );
        Ok(generation)
    }

    fn scan(&self, token: &CancellationToken) -> ScanContext<'_> {
        ScanContext::new(&self.db, token.clone(), self.timeout).with_table(self.table.clone())
    }

    /// Facet suggestions for `model`, served from the cache when the same
    /// model and thresholds were asked for at the current generation.
    pub fn suggestions(
        &self,
        model: &FilterModel,
        thresholds: Thresholds,
        token: &CancellationToken,
    ) -> Result<Arc<SuggestionMap>, AnalysisError> {
        let generation = self.refresh()?;
        let key = (model.clone(), thresholds.key(), generation);
        if let Some(hit) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let map = Arc::new(facets::suggestions(
            &self.scan(token),
            model,
            &self.lengths,
            thresholds,
            self.max_positions,
        )?);
        self.cache.insert(key, Arc::clone(&map));
        tracing::debug!(
            session = %self.id,
            { metrics::CACHE_HIT_RATE } = self.hit_rate(),
            "facet cache miss"
        );
        Ok(map)
    }

    pub fn rule_options(
        &self,
        model: &FilterModel,
        block_id: &BlockId,
        rule_id: &RuleId,
        thresholds: Thresholds,
        token: &CancellationToken,
    ) -> Result<Vec<FacetValue>, AnalysisError> {
        self.refresh()?;
        facets::rule_options(&self.scan(token), model, block_id, rule_id, &self.lengths, thresholds)
    }

    pub fn search(
        &self,
        model: &FilterModel,
        min_frequency: f64,
        limit: Option<usize>,
        token: &CancellationToken,
    ) -> Result<Vec<PhraseRow>, AnalysisError> {
        self.refresh()?;
        phrases::search(&self.scan(token), model, &self.lengths, min_frequency, limit)
    }

    /// Frequent runs of `feature`; empty when `phrase_length` is not one of
    /// the session's lengths.
    pub fn frequent_sequences(
        &self,
        model: &FilterModel,
        feature: Feature,
        phrase_length: u32,
        limit: usize,
        token: &CancellationToken,
    ) -> Result<Vec<SequenceRow>, AnalysisError> {
        if !self.lengths.contains(&phrase_length) {
            return Ok(Vec::new());
        }
        self.refresh()?;
        phrases::frequent_sequences(&self.scan(token), model, feature, phrase_length, limit)
    }

    /// Fraction of facet requests answered from the cache.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let total = hits + self.misses.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Drop the subset table and the cache.
    pub fn close(mut self) -> Result<(), AnalysisError> {
        self.closed = true;
        self.cache.invalidate_all();
        self.db
            .with_writer(|conn| subsets::drop_subset(conn, &self.table))?;
        tracing::info!(session = %self.id, "session closed");
        Ok(())
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self
            .db
            .with_writer(|conn| subsets::drop_subset(conn, &self.table))
        {
            tracing::warn!(session = %self.id, error = %e, "failed to drop session subset");
        }
    }
}
