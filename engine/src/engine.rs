use crate::build;
use crate::cache::{CacheStats, ResultCache};
use crate::error::EngineError;
use crate::history::SearchHistory;
use crate::rank;
use crate::shortcuts::{self, ProcessedQuery};
use crate::storage::HistoryStorage;
use crate::types::{
    Corpus, EngineConfig, GroupedResults, IndexedRecord, RankedHit, ResolvedOptions,
    ScoredResult, SearchOptions, SourceRecord,
};
use serde::ser::{Serialize, Serializer};

/// Ranked results for one raw query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse<'a> {
    /// Query after shortcut stripping
    pub query: String,
    pub results: Vec<ScoredResult<'a>>,
}

impl<'a> SearchResponse<'a> {
    pub fn groups(&self) -> GroupedResults<'_, 'a> {
        rank::group_results(&self.results)
    }
}

impl Serialize for SearchResponse<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct View<'r, 'a> {
            query: &'r str,
            results: &'r [ScoredResult<'a>],
            groups: GroupedResults<'r, 'a>,
        }

        View {
            query: &self.query,
            results: &self.results,
            groups: self.groups(),
        }
        .serialize(serializer)
    }
}

/// Search engine state: the current corpus, its result cache and the selection history
pub struct SearchEngine {
    corpus: Corpus,
    cache: ResultCache,
    history: SearchHistory,
    config: EngineConfig,
}

impl SearchEngine {
    /// Create a new search engine from source records, config and a history store
    pub fn new(
        sources: Vec<SourceRecord>,
        config: EngineConfig,
        storage: Box<dyn HistoryStorage>,
    ) -> Result<Self, EngineError> {
        Self::from_corpus(build::build_index(sources)?, config, storage)
    }

    /// Create a new search engine around an already built corpus
    pub fn from_corpus(
        corpus: Corpus,
        config: EngineConfig,
        storage: Box<dyn HistoryStorage>,
    ) -> Result<Self, EngineError> {
        shortcuts::validate_catalog(shortcuts::shortcuts())?;

        Ok(SearchEngine {
            corpus,
            cache: ResultCache::new(config.cache_capacity),
            history: SearchHistory::new(storage),
            config,
        })
    }

    /// Parse shortcuts off a raw query and search with the resulting options
    pub fn process_and_search(&mut self, raw_query: &str) -> SearchResponse<'_> {
        let ProcessedQuery { query, options } =
            shortcuts::process_query(raw_query).unwrap_or_else(|| ProcessedQuery {
                query: raw_query.to_string(),
                options: SearchOptions::default(),
            });

        let results = self.search(&query, &options);
        SearchResponse { query, results }
    }

    /// Search with explicit options, going through the result cache
    pub fn search(&mut self, query: &str, options: &SearchOptions) -> Vec<ScoredResult<'_>> {
        let resolved = options.resolve(self.config.default_max_results);
        let hits = self.ranked_hits(query, &resolved);
        rank::hydrate(&hits, &self.corpus)
    }

    fn ranked_hits(&mut self, query: &str, options: &ResolvedOptions) -> Vec<RankedHit> {
        if let Some(hits) = self.cache.get(query, options) {
            return hits.to_vec();
        }

        let hits = rank::rank(
            query,
            options,
            &self.corpus,
            &self.history.frequency_snapshot(),
        );
        self.cache.set(query, options, hits.clone());
        hits
    }

    /// Swap in a corpus built from new sources and drop every cached ranking.
    /// On error the current corpus and cache stay untouched.
    pub fn rebuild(&mut self, sources: Vec<SourceRecord>) -> Result<usize, EngineError> {
        let corpus = build::build_index(sources)?;
        Ok(self.replace_corpus(corpus))
    }

    /// Swap in an already built corpus and drop every cached ranking
    pub fn replace_corpus(&mut self, corpus: Corpus) -> usize {
        self.corpus = corpus;
        self.cache.clear();
        tracing::debug!(records = self.corpus.len(), "Swapped search corpus");
        self.corpus.len()
    }

    /// Remember a selection; cached rankings carry old history bonuses and are dropped
    pub fn record_selection(&mut self, result_id: &str) {
        self.history.record_selection(result_id);
        self.cache.clear();
    }

    /// Previously selected records still present in the corpus, most relevant first
    pub fn recent_suggestions(&self, limit: usize) -> Vec<&IndexedRecord> {
        self.history
            .recent_suggestions(self.history.len())
            .iter()
            .filter_map(|id| self.corpus.by_id(id))
            .take(limit)
            .collect()
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
