//! Deterministic RNG seeding for gap-filling.
//!
//! A master seed expands into per-(dataset, stream) sub-seeds via BLAKE3
//! hashing. Derivation is hash-based rather than order-dependent, so the
//! same master seed reconstructs identical synthetic values no matter how
//! many other datasets were ingested first.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic seed derivation for reconstruction RNGs.
#[derive(Debug, Clone)]
pub struct SeedSource {
    master_seed: u64,
}

impl SeedSource {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a sub-seed for a (dataset, stream) pair.
    pub fn sub_seed(&self, dataset: &str, stream: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(dataset.as_bytes());
        hasher.update(&stream.to_le_bytes());
        let hash = hasher.finalize();
        u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
    }

    /// Create a seeded StdRng for a (dataset, stream) pair.
    pub fn rng_for(&self, dataset: &str, stream: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(dataset, stream))
    }
}
