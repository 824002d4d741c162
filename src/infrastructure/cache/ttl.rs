//! TTL jitter for cache writes.
//!
//! Entries cached at the same moment with the same base TTL would otherwise
//! expire together and send a burst of misses to the persistent store.

use rand::Rng;

/// Returns `base ± uniform(0, base / 10)` seconds, never less than 1.
pub fn jittered_ttl(base_seconds: u64) -> u64 {
    jittered_ttl_with(&mut rand::rng(), base_seconds)
}

/// [`jittered_ttl`] with a caller-provided random source.
pub fn jittered_ttl_with<R: Rng>(rng: &mut R, base_seconds: u64) -> u64 {
    let spread = (base_seconds / 10) as i64;
    if spread == 0 {
        return base_seconds.max(1);
    }

    let offset = rng.random_range(-spread..=spread);
    (base_seconds as i64 + offset).max(1) as u64
}
