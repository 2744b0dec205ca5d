//! Randomness providers for key generation
//!
//! Key generation draws every random byte from the provider it is given.
//! [`SeededRandomness`] makes the output a pure function of the seed;
//! [`PlatformRandomness`] uses operating system entropy.

use super::Seed;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Source of the random stream consumed by key generation
pub trait RandomnessProvider {
    type Stream: RngCore + CryptoRng;

    /// A fresh stream. Deterministic providers restart from the same
    /// position on every call.
    fn stream(&self) -> Self::Stream;

    /// Whether two streams from this provider are identical
    fn is_deterministic(&self) -> bool;
}

/// ChaCha20 stream keyed by a [`Seed`]
#[derive(Clone)]
pub struct SeededRandomness {
    seed: Seed,
}

impl SeededRandomness {
    pub fn new(seed: Seed) -> Self {
        Self { seed }
    }
}

impl RandomnessProvider for SeededRandomness {
    type Stream = ChaCha20Rng;

    fn stream(&self) -> ChaCha20Rng {
        ChaCha20Rng::from_seed(*self.seed.as_bytes())
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}

/// Operating system entropy
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformRandomness;

impl RandomnessProvider for PlatformRandomness {
    type Stream = OsRng;

    fn stream(&self) -> OsRng {
        OsRng
    }

    fn is_deterministic(&self) -> bool {
        false
    }
}
