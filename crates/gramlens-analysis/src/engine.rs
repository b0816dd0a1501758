//! GramlensEngine: one store plus resolved configuration, exposing every
//! analysis operation with configured defaults.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use gramlens_core::config::GramlensConfig;
use gramlens_core::errors::{AnalysisError, GramlensResult, MergeError};
use gramlens_core::filter::{BlockId, FilterModel, RuleId};
use gramlens_core::traits::CancellationToken;
use gramlens_core::types::{
    FacetValue, MergeCandidateGroup, MergeOperation, MergeOutcome, PatternSummary, SuggestionMap,
    Thresholds,
};
use gramlens_storage::DatabaseManager;

use crate::construction::{self, Constructions, DecompositionOption};
use crate::facets;
use crate::merge::{self, MergePlan, PatternReview};
use crate::scan::ScanContext;
use crate::session::AnalysisSession;

pub struct GramlensEngine {
    db: Arc<DatabaseManager>,
    config: GramlensConfig,
}

impl GramlensEngine {
    /// Validate `config` and open the store it names.
    pub fn open(config: GramlensConfig) -> GramlensResult<Self> {
        GramlensConfig::validate(&config)?;
        let db = DatabaseManager::from_config(&config.storage)?;
        Ok(Self {
            db: Arc::new(db),
            config,
        })
    }

    /// Wrap an already open store.
    pub fn with_store(db: Arc<DatabaseManager>, config: GramlensConfig) -> Self {
        Self { db, config }
    }

    pub fn db(&self) -> &Arc<DatabaseManager> {
        &self.db
    }

    pub fn config(&self) -> &GramlensConfig {
        &self.config
    }

    /// Facet thresholds from the `facets` section.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_frequency: self.config.facets.effective_min_frequency(),
            min_quantity: self.config.facets.effective_min_quantity(),
        }
    }

    fn facet_scan(&self, token: &CancellationToken) -> ScanContext<'_> {
        ScanContext::new(
            &self.db,
            token.clone(),
            Duration::from_millis(self.config.facets.effective_timeout_ms()),
        )
    }

    pub fn session(&self, lengths: BTreeSet<u32>) -> Result<AnalysisSession, AnalysisError> {
        AnalysisSession::open(Arc::clone(&self.db), lengths, &self.config)
    }

    /// Suggestions over the whole corpus, without a session subset or cache.
    pub fn suggestions(
        &self,
        model: &FilterModel,
        lengths: &BTreeSet<u32>,
        thresholds: Thresholds,
        token: &CancellationToken,
    ) -> Result<SuggestionMap, AnalysisError> {
        facets::suggestions(
            &self.facet_scan(token),
            model,
            lengths,
            thresholds,
            self.config.facets.max_positions,
        )
    }

    pub fn rule_options(
        &self,
        model: &FilterModel,
        block_id: &BlockId,
        rule_id: &RuleId,
        lengths: &BTreeSet<u32>,
        token: &CancellationToken,
    ) -> Result<Vec<FacetValue>, AnalysisError> {
        facets::rule_options(
            &self.facet_scan(token),
            model,
            block_id,
            rule_id,
            lengths,
            self.thresholds(),
        )
    }

    pub fn find_candidates(
        &self,
        phrase_length: u32,
        token: &CancellationToken,
    ) -> Result<Option<MergeCandidateGroup>, AnalysisError> {
        let scan = ScanContext::new(
            &self.db,
            token.clone(),
            Duration::from_millis(self.config.merge.effective_timeout_ms()),
        );
        merge::find_candidates(&scan, phrase_length, self.config.merge.effective_max_difference_level())
    }

    pub fn skip_group(&self, group: &MergeCandidateGroup) -> Result<usize, AnalysisError> {
        merge::skip_group(&self.db, group)
    }

    pub fn lengths_available_for_merging(&self) -> Result<Vec<u32>, AnalysisError> {
        merge::lengths_available_for_merging(&self.db)
    }

    pub fn review(&self, pattern_ids: &[i64]) -> Result<Vec<PatternReview>, AnalysisError> {
        merge::patterns_with_examples(&self.db, pattern_ids, self.config.merge.effective_example_limit())
    }

    /// Validate and execute a merge batch.
    pub fn merge(&self, operations: Vec<MergeOperation>) -> Result<MergeOutcome, MergeError> {
        let plan = MergePlan::new(operations)?;
        merge::execute(&self.db, &plan)
    }

    pub fn decompose(&self, parent_id: i64) -> Result<Vec<DecompositionOption>, AnalysisError> {
        construction::decompose(&self.db, parent_id)
    }

    /// Construction lookup with the configured per-side limit.
    pub fn construct(&self, source_id: i64) -> Result<Constructions, AnalysisError> {
        construction::construct(&self.db, source_id, self.config.construction.effective_top_k())
    }

    pub fn parent_lengths(&self) -> Result<Vec<u32>, AnalysisError> {
        construction::parent_lengths(&self.db)
    }

    pub fn parents_of_length(&self, phrase_length: u32) -> Result<Vec<PatternSummary>, AnalysisError> {
        construction::parents_of_length(&self.db, phrase_length)
    }
}
