//! Seed derivation from a wallet signature
//!
//! The seed is the SHA-256 digest of the signature. Anyone holding the seed
//! can regenerate the private key, so it is never logged or displayed.

use super::IdentityError;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroize;

pub const SEED_SIZE: usize = 32;

/// Deterministic seed for key generation
#[derive(Clone, PartialEq, Eq)]
pub struct Seed {
    bytes: [u8; SEED_SIZE],
}

impl Seed {
    /// Derive a seed from signature bytes
    pub fn derive(signature: impl AsRef<[u8]>) -> Result<Self, IdentityError> {
        let signature = signature.as_ref();

        if signature.is_empty() {
            return Err(IdentityError::Derivation("signature is empty".into()));
        }
        if signature.iter().all(u8::is_ascii_whitespace) {
            return Err(IdentityError::Derivation("signature is blank".into()));
        }

        Ok(Self {
            bytes: Sha256::digest(signature).into(),
        })
    }

    /// Raw seed bytes
    pub fn as_bytes(&self) -> &[u8; SEED_SIZE] {
        &self.bytes
    }

    /// Hex form of the seed
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl Drop for Seed {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}
