//! Cryptography Module - RSA messaging primitives
//!
//! Provides RSA encryption and hash-then-sign signatures over explicit keys,
//! PEM key encoding, and the digests used by the rest of the crate.

pub mod encoding;
mod hashing;
pub mod messaging;

pub use encoding::{
    private_key_from_pem, private_key_to_pem, public_key_from_pem, public_key_to_pem, FromPem,
    KeyInput, PrivateKeyInput, PublicKeyInput,
};
pub use hashing::MessageDigest;
pub use messaging::{
    decrypt, encrypt, max_plaintext_len, sign, verify, Ciphertext, EncryptionPadding,
    SignatureBlob,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Message too long: {len} bytes, limit is {max} bytes")]
    MessageTooLong { len: usize, max: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
