//! RSA key pair generation and self-test

use super::{IdentityError, RandomnessProvider};
use crate::crypto::{self, CryptoError};
use crate::MessagingConfig;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use std::fmt;
use zeroize::Zeroizing;

/// RSA key pair used for messaging
#[derive(Clone, PartialEq)]
pub struct KeyPair {
    public_key: RsaPublicKey,
    private_key: RsaPrivateKey,
}

impl KeyPair {
    pub(crate) fn from_parts(public_key: RsaPublicKey, private_key: RsaPrivateKey) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Modulus size in bits
    pub fn modulus_bits(&self) -> usize {
        self.public_key.n().bits()
    }

    pub fn public_key_pem(&self) -> Result<String, CryptoError> {
        crypto::public_key_to_pem(&self.public_key)
    }

    pub fn private_key_pem(&self) -> Result<Zeroizing<String>, CryptoError> {
        crypto::private_key_to_pem(&self.private_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("modulus_bits", &self.modulus_bits())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Generate a key pair and run the self-test on it.
///
/// All randomness comes from `provider`. A pair that fails the self-test is
/// dropped and reported as [`IdentityError::SelfTestFailed`].
pub fn generate_key_pair<P: RandomnessProvider>(
    provider: &P,
    config: &MessagingConfig,
) -> Result<KeyPair, IdentityError> {
    let candidate = generate_candidate(provider, config)?;
    self_test(&candidate, config)?;
    Ok(candidate)
}

/// Generate a key pair without testing it
pub(crate) fn generate_candidate<P: RandomnessProvider>(
    provider: &P,
    config: &MessagingConfig,
) -> Result<KeyPair, IdentityError> {
    config
        .validate()
        .map_err(|e| IdentityError::Generation(e.to_string()))?;

    tracing::info!(
        "Generating {}-bit RSA key pair ({} randomness)",
        config.modulus_bits,
        if provider.is_deterministic() { "seeded" } else { "platform" }
    );

    let mut rng = provider.stream();
    let exponent = BigUint::from(config.public_exponent);
    let private_key = RsaPrivateKey::new_with_exp(&mut rng, config.modulus_bits, &exponent)
        .map_err(|e| IdentityError::Generation(e.to_string()))?;
    let public_key = private_key.to_public_key();

    Ok(KeyPair::from_parts(public_key, private_key))
}

/// Exercise a key pair before it is trusted.
///
/// Checks an encryption round trip, a signature round trip, and an
/// encryption round trip through the PEM encoded public key.
pub fn self_test(pair: &KeyPair, config: &MessagingConfig) -> Result<(), IdentityError> {
    let probe = config.self_test_message.as_bytes();
    let padding = config.padding;

    let ciphertext = crypto::encrypt(probe, &pair.public_key, padding)
        .map_err(|e| failed("encryption", e))?;
    let decrypted = crypto::decrypt(ciphertext.as_bytes(), &pair.private_key, padding)
        .map_err(|e| failed("decryption", e))?;
    if decrypted != probe {
        return Err(IdentityError::SelfTestFailed(
            "decrypted text does not match the probe".into(),
        ));
    }
    tracing::debug!("Encryption methods are ready");

    let signature = crypto::sign(probe, &pair.private_key).map_err(|e| failed("signing", e))?;
    let verified = crypto::verify(probe, &signature, &pair.public_key)
        .map_err(|e| failed("verification", e))?;
    if !verified {
        return Err(IdentityError::SelfTestFailed(
            "signature does not verify".into(),
        ));
    }
    tracing::debug!("Signature methods are ready");

    let pem = pair.public_key_pem().map_err(|e| failed("PEM encoding", e))?;
    let ciphertext = crypto::encrypt(probe, &pem, padding).map_err(|e| failed("PEM key encryption", e))?;
    let decrypted = crypto::decrypt(ciphertext.as_bytes(), &pair.private_key, padding)
        .map_err(|e| failed("PEM key decryption", e))?;
    if decrypted != probe {
        return Err(IdentityError::SelfTestFailed(
            "PEM encoded public key does not round trip".into(),
        ));
    }
    tracing::debug!("PEM conversion methods are ready");

    Ok(())
}

fn failed(step: &str, err: CryptoError) -> IdentityError {
    IdentityError::SelfTestFailed(format!("{} failed: {}", step, err))
}
