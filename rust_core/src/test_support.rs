//! Shared key fixtures for unit tests
//!
//! Small moduli keep the suite fast; the production size is exercised by
//! the ignored full-size tests.

use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rsa::RsaPrivateKey;

pub(crate) const TEST_MODULUS_BITS: usize = 1024;

pub(crate) static TEST_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| fixture_key(1));

pub(crate) static OTHER_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| fixture_key(2));

fn fixture_key(seed: u64) -> RsaPrivateKey {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    RsaPrivateKey::new(&mut rng, TEST_MODULUS_BITS).expect("fixture key generation")
}
