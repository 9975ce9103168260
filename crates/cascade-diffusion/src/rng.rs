//! Deterministic RNG sub-stream factory.
//!
//! Parallel sampling needs one independent generator per worker, derived
//! from a single master seed so any run is reproducible at any worker
//! count. Sub-streams are *split*, never reseeded ad hoc: stream `i` is
//! seeded with `splitmix64(master + (i + 1) * GOLDEN_GAMMA)`. SplitMix64 is
//! a bijective avalanche mixer, so distinct stream indices map to distinct,
//! decorrelated 64-bit seeds, and the derivation depends only on
//! `(master_seed, index)` — not on how many streams were handed out before.
//!
//! Stream index conventions used across the workspace:
//! - [`WEIGHT_STREAM`] — loader weight generation for unweighted input
//! - [`WORKER_STREAM_BASE`]` + worker_index` — per-worker sampling
//!   sub-streams; the sequential path is the one-worker case and uses
//!   worker stream 0, which is what makes its output identical to a
//!   single-worker parallel run.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Stream reserved for drawing edge weights while loading unweighted input.
pub const WEIGHT_STREAM: u64 = 0;
/// First worker sub-stream; worker `i` uses `WORKER_STREAM_BASE + i`.
pub const WORKER_STREAM_BASE: u64 = 1;

/// Weyl-sequence increment from the SplitMix64 reference implementation.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Factory deriving independent child generators from one master seed.
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    master_seed: u64,
}

impl RngFactory {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// The master seed this factory was built from.
    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Deterministically derive sub-stream `index`.
    pub fn stream(&self, index: u64) -> StdRng {
        let seed = splitmix64(
            self.master_seed
                .wrapping_add(index.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA)),
        );
        StdRng::seed_from_u64(seed)
    }

    /// Sub-stream for worker `worker_index` of a parallel generator.
    pub fn worker_stream(&self, worker_index: u64) -> StdRng {
        self.stream(WORKER_STREAM_BASE + worker_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_stream_is_reproducible() {
        let factory = RngFactory::new(42);
        let a: Vec<u64> = factory.stream(3).sample_iter(rand::distributions::Standard).take(8).collect();
        let b: Vec<u64> = factory.stream(3).sample_iter(rand::distributions::Standard).take(8).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_streams_differ() {
        let factory = RngFactory::new(42);
        let a: u64 = factory.stream(0).gen();
        let b: u64 = factory.stream(1).gen();
        assert_ne!(a, b);
    }

    #[test]
    fn streams_depend_only_on_master_and_index() {
        let f1 = RngFactory::new(7);
        let f2 = RngFactory::new(7);
        // Handing out streams in a different order must not change them.
        let _ = f1.stream(9);
        let a: u64 = f1.stream(4).gen();
        let b: u64 = f2.stream(4).gen();
        assert_eq!(a, b);
    }

    #[test]
    fn different_master_seeds_diverge() {
        let a: u64 = RngFactory::new(1).stream(0).gen();
        let b: u64 = RngFactory::new(2).stream(0).gen();
        assert_ne!(a, b);
    }
}
