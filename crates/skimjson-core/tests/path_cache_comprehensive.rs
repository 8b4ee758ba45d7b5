//! Comprehensive tests for path compilation and the accelerator caches
//!
//! Coverage targets:
//! - Tokenization rules (digits, empty tokens, oversized indexes)
//! - Plan walking, including index segments over objects
//! - Plan cache hits, misses and eviction
//! - Popularity ring record/probe visibility
//! - Concurrent use of shared caches

use std::sync::Arc;
use std::thread;

use skimjson::cache::{HOT_CAPACITY, PROBES, fnv1a};
use skimjson::parser::parse;
use skimjson::{Plan, PlanCache, PopularityCache, Segment};

fn key(k: &str) -> Segment {
    Segment::Key(k.to_string())
}

// ============================================================================
// Tokenization
// ============================================================================

#[test]
fn test_digit_token_is_index_even_over_object_key() {
    let plan = Plan::tokenize("123.x");
    assert_eq!(plan.segments(), &[Segment::Index(123), key("x")]);
}

#[test]
fn test_empty_tokens_become_empty_keys() {
    assert_eq!(Plan::tokenize(".a").segments(), &[key(""), key("a")]);
    assert_eq!(Plan::tokenize("a.").segments(), &[key("a"), key("")]);
    assert_eq!(
        Plan::tokenize("a..b").segments(),
        &[key("a"), key(""), key("b")]
    );
    assert!(Plan::tokenize("").is_empty());
}

#[test]
fn test_mixed_tokens_stay_keys() {
    assert_eq!(
        Plan::tokenize("1a.-1.0x1").segments(),
        &[key("1a"), key("-1"), key("0x1")]
    );
    assert_eq!(
        Plan::tokenize("99999999999999999999999").segments(),
        &[key("99999999999999999999999")]
    );
}

#[test]
fn test_plan_display_rejoins_path() {
    for path in ["a.b.0", "users.12.name", "a..b", "x"] {
        assert_eq!(Plan::tokenize(path).to_string(), path);
    }
}

// ============================================================================
// Plan walking
// ============================================================================

#[test]
fn test_resolve_mixed_path() {
    let buf = br#"{"users":[{"name":"ann","tags":["a","b"]}]}"#;
    let node = Plan::tokenize("users.0.tags.1").resolve(parse(buf));
    assert_eq!(node.as_str(), Some("b"));
}

#[test]
fn test_index_over_object_matches_decimal_key() {
    let root = parse(br#"{"123":{"x":"hit"},"007":1}"#);
    assert_eq!(Plan::tokenize("123.x").resolve(root).as_str(), Some("hit"));
    assert!(!Plan::tokenize("7").resolve(root).is_valid());
}

#[test]
fn test_empty_plan_resolves_to_root() {
    let root = parse(b" [1] ");
    assert_eq!(Plan::default().resolve(root), root);
}

#[test]
fn test_resolve_stops_at_first_miss() {
    let root = parse(br#"{"a":{"b":1}}"#);
    assert!(!Plan::tokenize("a.c.b").resolve(root).is_valid());
    assert!(!Plan::tokenize("a.b.c").resolve(root).is_valid());
    assert!(!Plan::tokenize("a.0").resolve(root).is_valid());
}

// ============================================================================
// Plan cache
// ============================================================================

#[test]
fn test_cached_and_fresh_plans_resolve_identically() {
    let cache = PlanCache::with_capacity(8);
    let buf = br#"{"a":{"b":[{"c":1},{"c":2}]},"d":"e"}"#;
    let root = parse(buf);
    let paths = ["a.b.1.c", "d", "a.b.0", "missing", "a.b.9.c"];

    for round in 0..3 {
        for path in paths {
            let cached = cache.compile(path).resolve(root);
            let fresh = Plan::tokenize(path).resolve(root);
            assert_eq!(cached.span(), fresh.span(), "{path} round {round}");
            assert_eq!(cached.kind(), fresh.kind());
        }
    }
}

#[test]
fn test_hit_after_miss_shares_plan() {
    let cache = PlanCache::new();
    let first = cache.compile("orders.0.id");
    assert!(cache.contains("orders.0.id"));
    let second = cache.compile("orders.0.id");
    assert!(Arc::ptr_eq(&first, &second));

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
    assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_compile_many_preserves_order() {
    let cache = PlanCache::new();
    let plans = cache.compile_many(vec!["a".to_string(), "b.1".to_string(), "".to_string()]);
    let rendered: Vec<_> = plans.iter().map(|p| p.to_string()).collect();
    assert_eq!(rendered, vec!["a", "b.1", ""]);
}

#[test]
fn test_small_cache_evicts_without_changing_results() {
    let cache = PlanCache::with_capacity(PROBES);
    let expected = Plan::tokenize("keep.0");
    for i in 0..100 {
        cache.compile(&format!("noise.{i}"));
        assert_eq!(*cache.compile("keep.0"), expected);
    }
    assert_eq!(cache.capacity(), PROBES);
}

#[test]
fn test_global_compile_is_shared() {
    let a = skimjson::compile("global.shared.path");
    let b = PlanCache::global().compile("global.shared.path");
    assert_eq!(*a, *b);
    assert_eq!(skimjson::compile_many(["x", "y"]).len(), 2);
}

// ============================================================================
// Popularity ring
// ============================================================================

#[test]
fn test_record_then_probe_is_immediate() {
    let ring = PopularityCache::new();
    assert_eq!(ring.capacity(), HOT_CAPACITY);
    for i in 0..HOT_CAPACITY * 4 {
        let path = format!("path.{i}");
        ring.record(&path);
        assert!(ring.probe(&path));
    }
}

#[test]
fn test_probe_is_exact_match() {
    let ring = PopularityCache::new();
    ring.record("name");
    assert!(!ring.probe("Name"));
    assert!(!ring.probe("name "));
    assert!(!ring.probe(""));
}

#[test]
fn test_hash_is_fnv1a() {
    assert_eq!(fnv1a(b"a"), 0xe40c_292c);
    assert_ne!(fnv1a(b"ab"), fnv1a(b"ba"));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_compile_on_shared_cache() {
    let cache = Arc::new(PlanCache::with_capacity(16));
    let buf: &'static [u8] = br#"{"a":[{"b":1},{"b":2},{"b":3}]}"#;

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let root = parse(buf);
                for i in 0..200 {
                    let index = (t + i) % 3;
                    let path = format!("a.{index}.b");
                    let node = cache.compile(&path).resolve(root);
                    assert_eq!(node.as_i64(), Some(index as i64 + 1));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 8 * 200);
}
