//! Bounded, TTL-based caching for similarity scores and search results.
//!
//! Two independently configured pools share one primitive: an LRU map
//! whose entries additionally expire by wall-clock TTL, checked lazily on
//! access. Keys are normalized before lookup — score keys are
//! order-independent in their two codes, result keys are insertion-order
//! independent in their specification pairs — so equivalent queries hit
//! the same entry. Statistics counters are atomic; reads and writes from
//! multiple callers interleave safely.

use crate::classify::SpecMap;
use chrono::{DateTime, Duration as TtlDuration, Utc};
use lru::LruCache;
use parking_lot::RwLock;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Bounds for one cache pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub struct CachePoolConfig {
    pub max_entries: usize,
    pub ttl_secs: i64,
}

impl CachePoolConfig {
    /// Score pool defaults: high cardinality, long TTL.
    pub fn score_defaults() -> Self {
        Self {
            max_entries: 10_000,
            ttl_secs: 3600,
        }
    }

    /// Search-result pool defaults: low cardinality, shorter TTL.
    pub fn result_defaults() -> Self {
        Self {
            max_entries: 100,
            ttl_secs: 1800,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    cached_at: DateTime<Utc>,
    last_access: DateTime<Utc>,
}

/// One pool: LRU-bounded, TTL-expiring, with atomic statistics.
struct TtlLruPool<V> {
    ttl: TtlDuration,
    entries: RwLock<LruCache<String, CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    load_nanos: AtomicU64,
    load_samples: AtomicU64,
}

impl<V: Clone> TtlLruPool<V> {
    fn new(config: CachePoolConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries.max(1))
            .expect("capacity is clamped to at least 1");
        Self {
            ttl: TtlDuration::seconds(config.ttl_secs),
            entries: RwLock::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            load_nanos: AtomicU64::new(0),
            load_samples: AtomicU64::new(0),
        }
    }

    fn get(&self, key: &str) -> Option<V> {
        let now = Utc::now();
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some(entry) if now <= entry.cached_at + self.ttl => {
                entry.last_access = now;
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            Some(_) => {
                // Expired: lazily drop it and report a miss. Expired
                // entries are never returned, whatever the LRU state.
                entries.pop(key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, key: String, value: V) {
        let now = Utc::now();
        let entry = CacheEntry {
            value,
            cached_at: now,
            last_access: now,
        };
        let mut entries = self.entries.write();
        if let Some((evicted_key, _)) = entries.push(key.clone(), entry) {
            // push returns the displaced pair: same key means an update,
            // a different key means the LRU victim fell out.
            if evicted_key != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn record_load_time(&self, elapsed: Duration) {
        self.load_nanos
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
        self.load_samples.fetch_add(1, Ordering::Relaxed);
    }

    fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let load_nanos = self.load_nanos.load(Ordering::Relaxed);
        let load_samples = self.load_samples.load(Ordering::Relaxed);
        CacheStats {
            entries: self.entries.read().len(),
            hits,
            misses,
            hit_rate: hit_rate(hits, misses),
            evictions: self.evictions.load(Ordering::Relaxed),
            average_load_time_ms: average_ms(load_nanos, load_samples),
        }
    }
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

fn average_ms(load_nanos: u64, load_samples: u64) -> f64 {
    if load_samples == 0 {
        0.0
    } else {
        (load_nanos as f64 / load_samples as f64) / 1_000_000.0
    }
}

/// Statistics snapshot for one pool or the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub evictions: u64,
    pub average_load_time_ms: f64,
}

/// Per-pool and aggregated statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityCacheStats {
    pub score: CacheStats,
    pub result: CacheStats,
    pub aggregate: CacheStats,
}

/// One search hit: a material code with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub code: String,
    pub score: f64,
}

/// Cached payload of one specification search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub hits: Vec<SearchHit>,
}

/// The two pools: similarity scores keyed by code pair, search results
/// keyed by normalized specification map.
pub struct SimilarityCache {
    scores: TtlLruPool<f64>,
    results: TtlLruPool<SearchResult>,
}

impl SimilarityCache {
    pub fn new(score_config: CachePoolConfig, result_config: CachePoolConfig) -> Self {
        Self {
            scores: TtlLruPool::new(score_config),
            results: TtlLruPool::new(result_config),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            CachePoolConfig::score_defaults(),
            CachePoolConfig::result_defaults(),
        )
    }

    /// Normalized score key: the two codes sorted, so `(a, b)` and
    /// `(b, a)` address the same entry.
    fn score_key(a: &str, b: &str) -> String {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        format!("{first}|{second}")
    }

    /// Normalized result key: `k=v` pairs sorted by key and joined with
    /// `,`, so equal maps address the same entry regardless of insertion
    /// order.
    fn result_key(specs: &SpecMap) -> String {
        let mut pairs: Vec<(&str, &str)> = specs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort();
        pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn get_score(&self, a: &str, b: &str) -> Option<f64> {
        self.scores.get(&Self::score_key(a, b))
    }

    pub fn put_score(&self, a: &str, b: &str, score: f64) {
        self.scores.put(Self::score_key(a, b), score);
    }

    pub fn get_search_result(&self, specs: &SpecMap) -> Option<SearchResult> {
        self.results.get(&Self::result_key(specs))
    }

    pub fn put_search_result(&self, specs: &SpecMap, result: SearchResult) {
        self.results.put(Self::result_key(specs), result);
    }

    /// Report how long a score computation took after a miss.
    pub fn record_score_load_time(&self, elapsed: Duration) {
        self.scores.record_load_time(elapsed);
    }

    /// Report how long a search took after a miss.
    pub fn record_result_load_time(&self, elapsed: Duration) {
        self.results.record_load_time(elapsed);
    }

    pub fn stats(&self) -> SimilarityCacheStats {
        let score = self.scores.stats();
        let result = self.results.stats();
        let load_nanos = self.scores.load_nanos.load(Ordering::Relaxed)
            + self.results.load_nanos.load(Ordering::Relaxed);
        let load_samples = self.scores.load_samples.load(Ordering::Relaxed)
            + self.results.load_samples.load(Ordering::Relaxed);
        let aggregate = CacheStats {
            entries: score.entries + result.entries,
            hits: score.hits + result.hits,
            misses: score.misses + result.misses,
            hit_rate: hit_rate(score.hits + result.hits, score.misses + result.misses),
            evictions: score.evictions + result.evictions,
            average_load_time_ms: average_ms(load_nanos, load_samples),
        };
        SimilarityCacheStats {
            score,
            result,
            aggregate,
        }
    }

    /// Invalidate both pools. Both locks are held for the duration, so a
    /// concurrent caller sees either both pools full or both empty.
    pub fn clear(&self) {
        let mut scores = self.scores.entries.write();
        let mut results = self.results.entries.write();
        scores.clear();
        results.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn tiny(max_entries: usize, ttl_secs: i64) -> CachePoolConfig {
        CachePoolConfig {
            max_entries,
            ttl_secs,
        }
    }

    fn result_of(codes: &[&str]) -> SearchResult {
        SearchResult {
            hits: codes
                .iter()
                .map(|code| SearchHit {
                    code: code.to_string(),
                    score: 0.9,
                })
                .collect(),
        }
    }

    fn specs(pairs: &[(&str, &str)]) -> SpecMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn score_keys_are_order_independent() {
        let cache = SimilarityCache::with_defaults();
        cache.put_score("M-100", "M-200", 0.85);

        assert_eq!(cache.get_score("M-200", "M-100"), Some(0.85));
        assert_eq!(cache.get_score("M-100", "M-200"), Some(0.85));
    }

    #[test]
    fn result_keys_are_insertion_order_independent() {
        let cache = SimilarityCache::with_defaults();
        let mut forward = SpecMap::new();
        forward.insert("bore".to_string(), "120".to_string());
        forward.insert("series".to_string(), "11".to_string());
        let mut reverse = SpecMap::new();
        reverse.insert("series".to_string(), "11".to_string());
        reverse.insert("bore".to_string(), "120".to_string());

        cache.put_search_result(&forward, result_of(&["M-1"]));
        let cached = cache.get_search_result(&reverse).expect("same normalized key");
        assert_eq!(cached.hits[0].code, "M-1");
    }

    #[test]
    fn expired_entries_are_never_returned() {
        let cache = SimilarityCache::new(tiny(10, 0), tiny(10, 0));
        cache.put_score("a", "b", 1.0);
        sleep(Duration::from_millis(5));

        assert_eq!(cache.get_score("a", "b"), None);
        let stats = cache.stats();
        assert_eq!(stats.score.evictions, 1);
        assert_eq!(stats.score.misses, 1);
    }

    #[test]
    fn capacity_eviction_drops_least_recently_used() {
        let cache = SimilarityCache::new(tiny(2, 3600), tiny(2, 3600));
        cache.put_score("a", "b", 0.1);
        cache.put_score("c", "d", 0.2);
        cache.get_score("a", "b");
        cache.put_score("e", "f", 0.3);

        assert_eq!(cache.get_score("a", "b"), Some(0.1), "recently used survives");
        assert_eq!(cache.get_score("c", "d"), None, "LRU victim evicted");
        assert_eq!(cache.stats().score.evictions, 1);
    }

    #[test]
    fn same_key_update_is_not_an_eviction() {
        let cache = SimilarityCache::new(tiny(2, 3600), tiny(2, 3600));
        cache.put_score("a", "b", 0.1);
        cache.put_score("b", "a", 0.9);

        assert_eq!(cache.get_score("a", "b"), Some(0.9));
        assert_eq!(cache.stats().score.evictions, 0);
    }

    #[test]
    fn stats_track_hits_misses_and_load_times() {
        let cache = SimilarityCache::with_defaults();
        cache.put_score("a", "b", 0.5);
        cache.get_score("a", "b");
        cache.get_score("x", "y");
        cache.record_score_load_time(Duration::from_millis(10));

        let stats = cache.stats();
        assert_eq!(stats.score.hits, 1);
        assert_eq!(stats.score.misses, 1);
        assert!((stats.score.hit_rate - 0.5).abs() < f64::EPSILON);
        assert!(stats.score.average_load_time_ms >= 10.0);

        assert_eq!(stats.aggregate.hits, 1);
        assert_eq!(stats.aggregate.misses, 1);
    }

    #[test]
    fn hits_refresh_the_last_access_stamp() {
        let cache = SimilarityCache::with_defaults();
        cache.put_score("a", "b", 0.5);
        let key = SimilarityCache::score_key("a", "b");
        let before = cache.scores.entries.write().get_mut(&key).unwrap().last_access;

        sleep(Duration::from_millis(5));
        cache.get_score("a", "b");

        let after = cache.scores.entries.write().get_mut(&key).unwrap().last_access;
        assert!(after > before);
    }

    #[test]
    fn clear_empties_both_pools() {
        let cache = SimilarityCache::with_defaults();
        cache.put_score("a", "b", 0.5);
        cache.put_search_result(&specs(&[("bore", "50")]), result_of(&["M-1"]));

        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.score.entries, 0);
        assert_eq!(stats.result.entries, 0);
    }
}
