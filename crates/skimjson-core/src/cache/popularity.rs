//! Recently-seen path ring
//!
//! Approximate recency only: writers rotate through a path's four candidate
//! slots (`hash + i`) and overwrite whatever is there, so a popular path can
//! be evicted by a burst of others. Used as a hint for whether a cheap lookup
//! is worth trying first, never for correctness.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arc_swap::ArcSwapOption;
use once_cell::sync::Lazy;

use super::{PROBES, fnv1a};

/// Slot count of the default ring
pub const HOT_CAPACITY: usize = 64;

static GLOBAL_POPULARITY: Lazy<Arc<PopularityCache>> =
    Lazy::new(|| Arc::new(PopularityCache::new()));

/// Fixed ring of recently looked-up paths
pub struct PopularityCache {
    ring: Box<[ArcSwapOption<String>]>,
    mask: u32,
    cursor: AtomicUsize,
}

impl PopularityCache {
    /// Ring with [`HOT_CAPACITY`] slots
    pub fn new() -> Self {
        Self::with_capacity(HOT_CAPACITY)
    }

    /// Ring with at least `slots` slots, rounded up to a power of two
    pub fn with_capacity(slots: usize) -> Self {
        let capacity = slots.max(PROBES).next_power_of_two().min(1 << 31);
        Self {
            ring: (0..capacity).map(|_| ArcSwapOption::empty()).collect(),
            mask: (capacity - 1) as u32,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Shared process-wide ring
    pub fn global() -> Arc<PopularityCache> {
        Arc::clone(&GLOBAL_POPULARITY)
    }

    /// Mark `path` as recently seen
    pub fn record(&self, path: &str) {
        let hash = fnv1a(path.as_bytes());
        let probe = self.cursor.fetch_add(1, Ordering::Relaxed) % PROBES;
        self.ring[self.slot(hash, probe)].store(Some(Arc::new(path.to_owned())));
    }

    /// Check if `path` was recently recorded
    ///
    /// False negatives are expected once the path has been overwritten.
    pub fn probe(&self, path: &str) -> bool {
        let hash = fnv1a(path.as_bytes());
        (0..PROBES).any(|probe| {
            let guard = self.ring[self.slot(hash, probe)].load();
            matches!(&*guard, Some(seen) if seen.as_str() == path)
        })
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    fn slot(&self, hash: u32, probe: usize) -> usize {
        (hash.wrapping_add(probe as u32) & self.mask) as usize
    }
}

impl Default for PopularityCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PopularityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopularityCache")
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_then_probe() {
        let cache = PopularityCache::new();
        assert!(!cache.probe("user.id"));
        cache.record("user.id");
        assert!(cache.probe("user.id"));
        assert!(!cache.probe("user.ID"));
    }

    #[test]
    fn test_every_record_is_immediately_visible() {
        let cache = PopularityCache::new();
        for i in 0..1000 {
            let path = format!("p{i}");
            cache.record(&path);
            assert!(cache.probe(&path), "{path} not visible after record");
        }
    }

    #[test]
    fn test_flooding_may_evict() {
        let cache = PopularityCache::with_capacity(4);
        cache.record("keep");
        for i in 0..256 {
            cache.record(&format!("other{i}"));
        }
        // No persistence guarantee; only that probing stays well-defined
        let _ = cache.probe("keep");
        assert_eq!(cache.capacity(), 4);
    }

    #[test]
    fn test_concurrent_record_and_probe() {
        let cache = Arc::new(PopularityCache::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let path = format!("t{t}.{i}");
                        cache.record(&path);
                        let _ = cache.probe(&path);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        cache.record("after");
        assert!(cache.probe("after"));
    }
}
