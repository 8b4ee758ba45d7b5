//! Lock-free accelerator caches
//!
//! Both caches are fixed-size slot tables of [`arc_swap::ArcSwapOption`]
//! entries. Readers never block and may see stale or just-overwritten slots;
//! every lookup has a correct slow path, so a miss only costs time.

mod plan_cache;
mod popularity;

pub use plan_cache::{CacheStats, PlanCache};
pub use popularity::{HOT_CAPACITY, PopularityCache};

/// Number of slots examined per lookup
pub const PROBES: usize = 4;

/// 32-bit FNV-1a hash
#[inline]
pub fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5u32, |h, &b| {
        (h ^ u32::from(b)).wrapping_mul(0x0100_0193)
    })
}
