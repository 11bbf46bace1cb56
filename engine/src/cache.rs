use crate::parse::normalize;
use crate::types::{RankedHit, ResolvedOptions};
use std::collections::HashMap;

pub const DEFAULT_CAPACITY: usize = 50;

/// Separates the query from the serialized options in a cache key
const KEY_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: Vec<RankedHit>,
    /// Logical access tick, larger is more recent
    pub last_accessed_at: u64,
}

/// Hit/miss counters since the cache was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Bounded LRU memo of ranking output. Values are corpus positions, not record
/// references; the engine clears it whenever the corpus or history changes.
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    clock: u64,
    stats: CacheStats,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        ResultCache {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    /// Normalized query plus the options serialized in their fixed field order
    pub fn cache_key(query: &str, options: &ResolvedOptions) -> String {
        let options_json = serde_json::to_string(options).unwrap_or_default();
        format!("{}{}{}", normalize(query), KEY_SEPARATOR, options_json)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Look up a ranking, refreshing its recency on a hit
    pub fn get(&mut self, query: &str, options: &ResolvedOptions) -> Option<&[RankedHit]> {
        let key = Self::cache_key(query, options);
        let now = self.tick();
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.last_accessed_at = now;
                self.stats.hits += 1;
                Some(&entry.value)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn set(&mut self, query: &str, options: &ResolvedOptions, value: Vec<RankedHit>) {
        let key = Self::cache_key(query, options);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_lru();
        }
        let now = self.tick();
        self.entries.insert(
            key.clone(),
            CacheEntry {
                key,
                value,
                last_accessed_at: now,
            },
        );
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .values()
            .min_by_key(|entry| entry.last_accessed_at)
            .map(|entry| entry.key.clone());
        if let Some(key) = oldest {
            tracing::debug!(key = %key, "Evicting least recently used search result");
            self.entries.remove(&key);
        }
    }

    /// Whether a ranking is cached, without touching its recency
    pub fn contains(&self, query: &str, options: &ResolvedOptions) -> bool {
        self.entries.contains_key(&Self::cache_key(query, options))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        ResultCache::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchedFields, SearchOptions};

    fn hits(position: usize) -> Vec<RankedHit> {
        vec![RankedHit {
            position,
            score: 1.0,
            matched_fields: MatchedFields::new(),
        }]
    }

    #[test]
    fn test_get_after_set() {
        let mut cache = ResultCache::new(4);
        let options = ResolvedOptions::default();
        assert!(cache.get("button", &options).is_none());
        cache.set("button", &options, hits(3));
        assert_eq!(cache.get("button", &options).map(|h| h[0].position), Some(3));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_key_ignores_case_and_edge_whitespace() {
        let options = ResolvedOptions::default();
        assert_eq!(
            ResultCache::cache_key(" Button ", &options),
            ResultCache::cache_key("button", &options)
        );
    }

    #[test]
    fn test_equivalent_options_share_a_key() {
        let explicit = SearchOptions {
            include_stories: Some(true),
            include_docs: Some(true),
            ..SearchOptions::default()
        }
        .resolve(50);
        let implicit = SearchOptions::default().resolve(50);
        assert_eq!(
            ResultCache::cache_key("modal", &explicit),
            ResultCache::cache_key("modal", &implicit)
        );
    }

    #[test]
    fn test_different_options_do_not_collide() {
        let stories = SearchOptions {
            include_docs: Some(false),
            ..SearchOptions::default()
        }
        .resolve(50);
        assert_ne!(
            ResultCache::cache_key("modal", &stories),
            ResultCache::cache_key("modal", &ResolvedOptions::default())
        );
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = ResultCache::new(2);
        let options = ResolvedOptions::default();
        cache.set("a", &options, hits(0));
        cache.set("b", &options, hits(1));
        // Touch "a" so "b" becomes the oldest
        assert!(cache.get("a", &options).is_some());
        cache.set("c", &options, hits(2));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a", &options));
        assert!(!cache.contains("b", &options));
        assert!(cache.get("b", &options).is_none());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut cache = ResultCache::new(2);
        let options = ResolvedOptions::default();
        cache.set("a", &options, hits(0));
        cache.set("b", &options, hits(1));
        cache.set("a", &options, hits(5));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a", &options).map(|h| h[0].position), Some(5));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut cache = ResultCache::new(0);
        cache.set("a", &ResolvedOptions::default(), hits(0));
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = ResultCache::default();
        let options = ResolvedOptions::default();
        cache.set("a", &options, hits(0));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a", &options).is_none());
    }
}
