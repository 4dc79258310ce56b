// =============================================================================
// Similarity/Result Cache Tests
// =============================================================================
// Cross-pool behaviour over the public API: key normalization, TTL
// expiry, statistics aggregation, and atomic clear.

use bom_ontology::cache::{CachePoolConfig, SearchHit, SearchResult, SimilarityCache};
use bom_ontology::classify::SpecMap;
use proptest::prelude::*;
use std::time::Duration;

fn pool(max_entries: usize, ttl_secs: i64) -> CachePoolConfig {
    CachePoolConfig {
        max_entries,
        ttl_secs,
    }
}

fn sample_result() -> SearchResult {
    SearchResult {
        hits: vec![SearchHit {
            code: "30112120000450Y7".to_string(),
            score: 0.92,
        }],
    }
}

#[test]
fn both_pools_start_empty_with_zeroed_stats() {
    let cache = SimilarityCache::with_defaults();
    let stats = cache.stats();
    assert_eq!(stats.score.entries, 0);
    assert_eq!(stats.result.entries, 0);
    assert_eq!(stats.aggregate.hits, 0);
    assert_eq!(stats.aggregate.hit_rate, 0.0);
}

#[test]
fn search_results_hit_regardless_of_spec_insertion_order() {
    let cache = SimilarityCache::with_defaults();

    let mut forward = SpecMap::new();
    forward.insert("bore".to_string(), "120".to_string());
    forward.insert("stroke".to_string(), "450".to_string());
    forward.insert("series".to_string(), "11".to_string());

    let mut reverse = SpecMap::new();
    reverse.insert("series".to_string(), "11".to_string());
    reverse.insert("stroke".to_string(), "450".to_string());
    reverse.insert("bore".to_string(), "120".to_string());

    cache.put_search_result(&forward, sample_result());
    assert!(cache.get_search_result(&reverse).is_some());

    let stats = cache.stats();
    assert_eq!(stats.result.hits, 1);
    assert_eq!(stats.result.misses, 0);
}

#[test]
fn pools_expire_independently() {
    let cache = SimilarityCache::new(pool(10, 3600), pool(10, 0));
    cache.put_score("a", "b", 0.7);
    cache.put_search_result(&SpecMap::new(), sample_result());
    std::thread::sleep(Duration::from_millis(5));

    assert_eq!(cache.get_score("a", "b"), Some(0.7), "score pool still live");
    assert!(
        cache.get_search_result(&SpecMap::new()).is_none(),
        "result pool expired"
    );
}

#[test]
fn aggregate_stats_sum_over_pools() {
    let cache = SimilarityCache::with_defaults();
    cache.put_score("a", "b", 0.5);
    cache.get_score("a", "b");
    cache.get_score("never", "seen");

    cache.put_search_result(&SpecMap::new(), sample_result());
    cache.get_search_result(&SpecMap::new());

    let stats = cache.stats();
    assert_eq!(stats.aggregate.hits, stats.score.hits + stats.result.hits);
    assert_eq!(stats.aggregate.misses, stats.score.misses + stats.result.misses);
    assert_eq!(stats.aggregate.entries, 2);
}

#[test]
fn load_times_feed_the_average() {
    let cache = SimilarityCache::with_defaults();
    cache.record_score_load_time(Duration::from_millis(20));
    cache.record_score_load_time(Duration::from_millis(40));

    let stats = cache.stats();
    assert!(stats.score.average_load_time_ms >= 29.0);
    assert!(stats.score.average_load_time_ms <= 31.0);
}

#[test]
fn clear_invalidates_both_pools() {
    let cache = SimilarityCache::with_defaults();
    cache.put_score("a", "b", 0.5);
    cache.put_search_result(&SpecMap::new(), sample_result());

    cache.clear();

    assert!(cache.get_score("a", "b").is_none());
    assert!(cache.get_search_result(&SpecMap::new()).is_none());
}

proptest! {
    /// putScore(a, b, s) is always observable via getScore(b, a).
    #[test]
    fn score_cache_is_symmetric(a in "[A-Z0-9\\-]{1,20}", b in "[A-Z0-9\\-]{1,20}", score in 0.0f64..=1.0) {
        let cache = SimilarityCache::with_defaults();
        cache.put_score(&a, &b, score);
        prop_assert_eq!(cache.get_score(&b, &a), Some(score));
    }
}
