//! Compiled-plan cache
//!
//! A power-of-two table of slots. A path hashes (FNV-1a) to four candidate
//! slots at `hash + i * 0x9e3779b9`; a hit returns the shared plan, a miss
//! tokenizes and publishes into one of the candidates, rotating through them
//! with a wrapping cursor. Publication overwrites whatever was there.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use arc_swap::ArcSwapOption;
use once_cell::sync::Lazy;

use super::{PROBES, fnv1a};
use crate::config::DEFAULT_PLAN_CACHE_SLOTS;
use crate::path::Plan;

const PROBE_STRIDE: u32 = 0x9e37_79b9;

pub(crate) static GLOBAL_PLAN_CACHE: Lazy<Arc<PlanCache>> =
    Lazy::new(|| Arc::new(PlanCache::new()));

static EMPTY_PLAN: Lazy<Arc<Plan>> = Lazy::new(|| Arc::new(Plan::default()));

struct Entry {
    path: Box<str>,
    plan: Arc<Plan>,
}

/// Hit and miss counters of a [`PlanCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered from a slot
    pub hits: u64,
    /// Lookups that had to tokenize
    pub misses: u64,
    /// Slot count
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from a slot
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded, lock-free cache of compiled path plans
pub struct PlanCache {
    slots: Box<[ArcSwapOption<Entry>]>,
    mask: u32,
    cursor: AtomicUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PlanCache {
    /// Cache with the default 512 slots
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PLAN_CACHE_SLOTS)
    }

    /// Cache with at least `slots` slots, rounded up to a power of two
    pub fn with_capacity(slots: usize) -> Self {
        let capacity = slots.max(PROBES).next_power_of_two().min(1 << 31);
        Self {
            slots: (0..capacity).map(|_| ArcSwapOption::empty()).collect(),
            mask: (capacity - 1) as u32,
            cursor: AtomicUsize::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Shared process-wide cache
    pub fn global() -> Arc<PlanCache> {
        Arc::clone(&GLOBAL_PLAN_CACHE)
    }

    /// Compiled plan for `path`, from a slot when possible
    pub fn compile(&self, path: &str) -> Arc<Plan> {
        if path.is_empty() {
            return Arc::clone(&EMPTY_PLAN);
        }

        let hash = fnv1a(path.as_bytes());
        for probe in 0..PROBES {
            let guard = self.slots[self.slot(hash, probe)].load();
            if let Some(entry) = &*guard
                && &*entry.path == path
            {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(&entry.plan);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let plan = Arc::new(Plan::tokenize(path));
        let probe = self.cursor.fetch_add(1, Ordering::Relaxed) % PROBES;
        let slot = self.slot(hash, probe);
        self.slots[slot].store(Some(Arc::new(Entry {
            path: path.into(),
            plan: Arc::clone(&plan),
        })));
        tracing::trace!(path, slot, "compiled path plan");
        plan
    }

    /// Compile each of `paths`
    pub fn compile_many<I, S>(&self, paths: I) -> Vec<Arc<Plan>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths.into_iter().map(|p| self.compile(p.as_ref())).collect()
    }

    /// Check if `path` currently occupies a slot
    pub fn contains(&self, path: &str) -> bool {
        let hash = fnv1a(path.as_bytes());
        (0..PROBES).any(|probe| {
            let guard = self.slots[self.slot(hash, probe)].load();
            matches!(&*guard, Some(entry) if &*entry.path == path)
        })
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current hit and miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            capacity: self.capacity(),
        }
    }

    #[inline]
    fn slot(&self, hash: u32, probe: usize) -> usize {
        (hash.wrapping_add((probe as u32).wrapping_mul(PROBE_STRIDE)) & self.mask) as usize
    }
}

impl Default for PlanCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Segment;

    #[test]
    fn test_capacity_rounding() {
        assert_eq!(PlanCache::new().capacity(), 512);
        assert_eq!(PlanCache::with_capacity(100).capacity(), 128);
        assert_eq!(PlanCache::with_capacity(0).capacity(), PROBES);
    }

    #[test]
    fn test_hit_returns_shared_plan() {
        let cache = PlanCache::new();
        let first = cache.compile("a.b.0");
        let second = cache.compile("a.b.0");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
        assert!(cache.contains("a.b.0"));
    }

    #[test]
    fn test_empty_path_is_root_plan() {
        let cache = PlanCache::new();
        assert!(cache.compile("").is_empty());
        assert_eq!(cache.stats().misses, 0);
    }

    #[test]
    fn test_eviction_keeps_results_identical() {
        let cache = PlanCache::with_capacity(4);
        let before = cache.compile("x.1");
        for i in 0..64 {
            cache.compile(&format!("filler.{i}"));
        }
        let after = cache.compile("x.1");
        assert_eq!(*before, *after);
        assert_eq!(
            after.segments(),
            &[Segment::Key("x".into()), Segment::Index(1)]
        );
    }

    #[test]
    fn test_compile_many() {
        let cache = PlanCache::new();
        let plans = cache.compile_many(["a", "b.c"]);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[1].len(), 2);
    }

    #[test]
    fn test_stats_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            capacity: 512,
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
