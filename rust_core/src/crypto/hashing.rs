//! Message digests
//!
//! SHA-256 is the unit that RSA signatures cover.

use sha2::{Digest, Sha256};

/// SHA-256 digest of a message (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDigest([u8; 32]);

impl MessageDigest {
    /// Hash data and return its digest
    pub fn sha256(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}
