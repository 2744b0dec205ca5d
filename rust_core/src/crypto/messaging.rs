//! RSA messaging operations over explicit keys
//!
//! Encryption is direct single-block RSA (no envelope). Signatures are
//! RSASSA-PKCS1-v1_5 over the SHA-256 digest of the message.

use super::{CryptoError, MessageDigest, PrivateKeyInput, PublicKeyInput};
use base64::Engine;
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// PKCS#1 v1.5 encryption overhead
const PKCS1V15_OVERHEAD: usize = 11;
/// OAEP overhead with SHA-256 (2 * hash length + 2)
const OAEP_SHA256_OVERHEAD: usize = 2 * 32 + 2;

/// RSA encryption padding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionPadding {
    /// RSAES-PKCS1-v1_5, the format existing peers produce
    #[default]
    Pkcs1v15,
    /// RSAES-OAEP with SHA-256 and MGF1-SHA-256
    OaepSha256,
}

/// Output of RSA encryption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.0)
    }

    pub fn from_base64(s: &str) -> Result<Self, CryptoError> {
        base64::engine::general_purpose::STANDARD
            .decode(s.trim())
            .map(Self)
            .map_err(|e| CryptoError::InvalidData(e.to_string()))
    }
}

impl From<Vec<u8>> for Ciphertext {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Ciphertext {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Output of RSA signing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlob(Vec<u8>);

impl SignatureBlob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.0)
    }

    pub fn from_base64(s: &str) -> Result<Self, CryptoError> {
        base64::engine::general_purpose::STANDARD
            .decode(s.trim())
            .map(Self)
            .map_err(|e| CryptoError::InvalidData(e.to_string()))
    }
}

impl From<Vec<u8>> for SignatureBlob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for SignatureBlob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Largest message that fits in one RSA block for this key and padding
pub fn max_plaintext_len(key: &RsaPublicKey, padding: EncryptionPadding) -> usize {
    let overhead = match padding {
        EncryptionPadding::Pkcs1v15 => PKCS1V15_OVERHEAD,
        EncryptionPadding::OaepSha256 => OAEP_SHA256_OVERHEAD,
    };
    key.size().saturating_sub(overhead)
}

/// Encrypt a message for the holder of `public_key`
pub fn encrypt<'a>(
    message: &[u8],
    public_key: impl Into<PublicKeyInput<'a>>,
    padding: EncryptionPadding,
) -> Result<Ciphertext, CryptoError> {
    let key = public_key.into().resolve()?;

    let max = max_plaintext_len(&key, padding);
    if message.len() > max {
        return Err(CryptoError::MessageTooLong {
            len: message.len(),
            max,
        });
    }

    let mut rng = OsRng;
    let encrypted = match padding {
        EncryptionPadding::Pkcs1v15 => key.encrypt(&mut rng, Pkcs1v15Encrypt, message),
        EncryptionPadding::OaepSha256 => key.encrypt(&mut rng, Oaep::new::<Sha256>(), message),
    }
    .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    tracing::debug!(
        "Encrypted {} bytes into {} byte ciphertext",
        message.len(),
        encrypted.len()
    );
    Ok(Ciphertext(encrypted))
}

/// Decrypt a ciphertext produced for the matching public key
pub fn decrypt<'a>(
    ciphertext: &[u8],
    private_key: impl Into<PrivateKeyInput<'a>>,
    padding: EncryptionPadding,
) -> Result<Vec<u8>, CryptoError> {
    let key = private_key.into().resolve()?;

    let decrypted = match padding {
        EncryptionPadding::Pkcs1v15 => key.decrypt(Pkcs1v15Encrypt, ciphertext),
        EncryptionPadding::OaepSha256 => key.decrypt(Oaep::new::<Sha256>(), ciphertext),
    }
    .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

    tracing::debug!("Decrypted {} byte ciphertext", ciphertext.len());
    Ok(decrypted)
}

/// Sign the SHA-256 digest of `message`
pub fn sign<'a>(
    message: &[u8],
    private_key: impl Into<PrivateKeyInput<'a>>,
) -> Result<SignatureBlob, CryptoError> {
    let key = private_key.into().resolve()?;
    let digest = MessageDigest::sha256(message);

    key.sign(Pkcs1v15Sign::new::<Sha256>(), digest.as_bytes())
        .map(SignatureBlob)
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))
}

/// Verify a signature over the SHA-256 digest of `message`.
///
/// A signature that does not match (including one of the wrong length) is
/// `Ok(false)`. Only key material that cannot be decoded is an error.
pub fn verify<'a>(
    message: &[u8],
    signature: impl AsRef<[u8]>,
    public_key: impl Into<PublicKeyInput<'a>>,
) -> Result<bool, CryptoError> {
    let key = public_key.into().resolve()?;
    let digest = MessageDigest::sha256(message);

    let verified = key
        .verify(
            Pkcs1v15Sign::new::<Sha256>(),
            digest.as_bytes(),
            signature.as_ref(),
        )
        .is_ok();

    tracing::debug!("Signature verified: {}", verified);
    Ok(verified)
}
