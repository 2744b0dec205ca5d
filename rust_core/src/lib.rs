//! SigKey Core - Messaging keys derived from wallet signatures
//!
//! This crate derives a reproducible RSA key pair from a wallet signature
//! and provides encryption, decryption, signing and verification on top of
//! it. The same signature always regenerates the same key pair, so nothing
//! has to be persisted.

pub mod crypto;
pub mod identity;
pub mod logging;
pub mod wallet;

#[cfg(test)]
mod test_support;

use crypto::EncryptionPadding;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Main error type for SigKey operations
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] crypto::CryptoError),

    #[error("Identity error: {0}")]
    Identity(#[from] identity::IdentityError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] wallet::WalletError),

    #[error("Logging error: {0}")]
    Logging(#[from] logging::LoggingError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MessagingError>;

/// Smallest modulus accepted by [`MessagingConfig::validate`]
pub const MIN_MODULUS_BITS: usize = 1024;

/// Core configuration for messaging keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// RSA modulus size in bits
    pub modulus_bits: usize,

    /// RSA public exponent
    pub public_exponent: u64,

    /// Padding used for encryption
    pub padding: EncryptionPadding,

    /// Plaintext used by the key pair self-test
    pub self_test_message: String,

    /// Allow keys derived from a wallet signature. Anyone who obtains the
    /// signature can rebuild the private key.
    pub acknowledge_signature_derived_keys: bool,

    /// Default tracing filter (overridden by `RUST_LOG`)
    pub log_filter: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            modulus_bits: 4096,
            public_exponent: 65537,
            padding: EncryptionPadding::Pkcs1v15,
            self_test_message: "Hello".to_string(),
            acknowledge_signature_derived_keys: false,
            log_filter: "info".to_string(),
        }
    }
}

impl MessagingConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MessagingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.modulus_bits < MIN_MODULUS_BITS || self.modulus_bits % 8 != 0 {
            return Err(MessagingError::Config(format!(
                "modulus_bits must be a multiple of 8 and at least {}, got {}",
                MIN_MODULUS_BITS, self.modulus_bits
            )));
        }
        if self.public_exponent < 3 || self.public_exponent % 2 == 0 {
            return Err(MessagingError::Config(format!(
                "public_exponent must be odd and at least 3, got {}",
                self.public_exponent
            )));
        }
        if self.self_test_message.is_empty() {
            return Err(MessagingError::Config("self_test_message is empty".into()));
        }

        // OAEP-SHA256 has the larger overhead
        let max_probe = self.modulus_bits / 8 - (2 * 32 + 2);
        if self.self_test_message.len() > max_probe {
            return Err(MessagingError::Config(format!(
                "self_test_message must be at most {} bytes",
                max_probe
            )));
        }
        Ok(())
    }
}

/// Messaging endpoint backed by a signature derived key pair
pub struct MessagingNode {
    pub keys: Arc<identity::KeyStore>,
    pub config: MessagingConfig,
}

impl MessagingNode {
    /// Create a node with no active keys
    pub fn new(config: MessagingConfig) -> Result<Self> {
        config.validate()?;
        let keys = Arc::new(identity::KeyStore::new(config.clone()));
        Ok(Self { keys, config })
    }

    /// Create a node and derive its keys from a wallet signature
    pub fn from_signature(signature: impl AsRef<[u8]>, config: MessagingConfig) -> Result<Self> {
        let node = Self::new(config)?;
        node.keys.generate_from_signature(signature)?;
        Ok(node)
    }

    /// Public key PEM to hand to peers
    pub fn public_key_pem(&self) -> Result<String> {
        Ok(self.keys.public_key_pem()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> MessagingConfig {
        MessagingConfig {
            modulus_bits: test_support::TEST_MODULUS_BITS,
            acknowledge_signature_derived_keys: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = MessagingConfig::default();
        assert_eq!(config.modulus_bits, 4096);
        assert_eq!(config.public_exponent, 65537);
        assert!(!config.acknowledge_signature_derived_keys);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config = MessagingConfig::from_json(
            r#"{ "modulus_bits": 2048, "padding": "oaep_sha256", "acknowledge_signature_derived_keys": true }"#,
        )
        .unwrap();

        assert_eq!(config.modulus_bits, 2048);
        assert_eq!(config.padding, EncryptionPadding::OaepSha256);
        assert_eq!(config.self_test_message, "Hello");
        assert!(config.acknowledge_signature_derived_keys);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(MessagingConfig::from_json("{ not json").is_err());
        assert!(MessagingConfig::from_json(r#"{ "modulus_bits": 512 }"#).is_err());
        assert!(MessagingConfig::from_json(r#"{ "public_exponent": 65536 }"#).is_err());
        assert!(MessagingConfig::from_json(r#"{ "self_test_message": "" }"#).is_err());

        let long = "x".repeat(200);
        let config = MessagingConfig {
            modulus_bits: 1024,
            self_test_message: long,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MessagingError::Config(_))));
    }

    #[test]
    fn test_create_node() {
        let node = MessagingNode::from_signature("0xdeadbeef", test_config()).unwrap();
        assert!(!node.public_key_pem().unwrap().is_empty());

        // Test recovery
        let recovered = MessagingNode::from_signature("0xdeadbeef", test_config()).unwrap();
        assert_eq!(node.public_key_pem().unwrap(), recovered.public_key_pem().unwrap());
    }

    #[test]
    fn test_node_without_keys() {
        let node = MessagingNode::new(test_config()).unwrap();
        assert!(matches!(
            node.public_key_pem(),
            Err(MessagingError::Identity(identity::IdentityError::NoActiveKey))
        ));
    }
}
