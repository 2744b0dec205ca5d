//! Identity Module - Messaging keys derived from a wallet signature
//!
//! A wallet signature is hashed into a [`Seed`], the seed keys a
//! deterministic random stream, and that stream alone drives RSA key
//! generation. The same signature therefore always yields the same key
//! pair. Accepted pairs live in a [`KeyStore`].

mod keys;
mod randomness;
mod seed;

pub use keys::{generate_key_pair, self_test, KeyPair};
pub use randomness::{PlatformRandomness, RandomnessProvider, SeededRandomness};
pub use seed::{Seed, SEED_SIZE};

use crate::crypto::{self, Ciphertext, CryptoError, PublicKeyInput, SignatureBlob};
use crate::wallet::{self, WalletError, WalletSigner};
use crate::MessagingConfig;
use parking_lot::{Mutex, RwLock};
use rsa::RsaPublicKey;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Seed derivation failed: {0}")]
    Derivation(String),

    #[error("Key generation failed: {0}")]
    Generation(String),

    #[error("Key pair self-test failed: {0}")]
    SelfTestFailed(String),

    #[error("No active messaging key pair")]
    NoActiveKey,

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
}

/// Where a [`KeyStore`] is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLifecycle {
    Uninitialized,
    Generating,
    Active,
}

/// An accepted key pair with its public encoding
struct ActiveKeys {
    pair: KeyPair,
    public_pem: String,
}

impl ActiveKeys {
    fn new(pair: KeyPair) -> Result<Self, IdentityError> {
        let public_pem = pair.public_key_pem()?;
        Ok(Self { pair, public_pem })
    }
}

/// Clears the generating flag when a generation attempt ends
struct GeneratingFlag<'a>(&'a AtomicBool);

impl<'a> GeneratingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for GeneratingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Holds the active messaging key pair.
///
/// Generation calls are serialized; the last successful one wins. Every
/// messaging operation works on one snapshot of the active pair. There is
/// no accessor for the private key.
pub struct KeyStore {
    config: MessagingConfig,
    active: RwLock<Option<Arc<ActiveKeys>>>,
    generation: Mutex<()>,
    generating: AtomicBool,
}

impl KeyStore {
    pub fn new(config: MessagingConfig) -> Self {
        Self {
            config,
            active: RwLock::new(None),
            generation: Mutex::new(()),
            generating: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    pub fn state(&self) -> KeyLifecycle {
        if self.generating.load(Ordering::SeqCst) {
            KeyLifecycle::Generating
        } else if self.active.read().is_some() {
            KeyLifecycle::Active
        } else {
            KeyLifecycle::Uninitialized
        }
    }

    /// Derive and install the key pair for a wallet signature.
    ///
    /// Anyone who has seen the signature can rebuild the private key, so
    /// this refuses to run unless the configuration acknowledges that.
    pub fn generate_from_signature(&self, signature: impl AsRef<[u8]>) -> Result<(), IdentityError> {
        if !self.config.acknowledge_signature_derived_keys {
            return Err(IdentityError::Derivation(
                "keys derived from a wallet signature can be rebuilt by anyone holding that \
                 signature; set acknowledge_signature_derived_keys to allow it"
                    .into(),
            ));
        }

        let seed = Seed::derive(signature)?;
        tracing::info!("Deterministic seed generated");

        self.generate(&SeededRandomness::new(seed))
    }

    /// Ask `wallet` to sign `challenge`, then derive keys from that signature
    pub fn generate_from_wallet<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        challenge: &[u8],
    ) -> Result<(), IdentityError> {
        let signature = wallet::sign_message(wallet, challenge)?;
        self.generate_from_signature(signature.to_hex())
    }

    /// Generate, test and install a key pair from `provider`
    pub fn generate<P: RandomnessProvider>(&self, provider: &P) -> Result<(), IdentityError> {
        let _flight = self.generation.lock();
        let _flag = GeneratingFlag::raise(&self.generating);

        let candidate = keys::generate_candidate(provider, &self.config)?;
        self.accept(candidate)
    }

    /// Run key generation from a signature on the blocking thread pool
    pub async fn generate_async(self: &Arc<Self>, signature: Vec<u8>) -> Result<(), IdentityError> {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.generate_from_signature(&signature))
            .await
            .map_err(|e| IdentityError::Generation(format!("key generation task failed: {}", e)))?
    }

    /// Self-test a candidate and make it active if it passes
    pub(crate) fn accept(&self, candidate: KeyPair) -> Result<(), IdentityError> {
        if let Err(e) = self_test(&candidate, &self.config) {
            tracing::warn!("Rejecting generated key pair: {}", e);
            return Err(e);
        }

        let keys = ActiveKeys::new(candidate)?;
        *self.active.write() = Some(Arc::new(keys));
        tracing::info!("Messaging key pair is active");
        Ok(())
    }

    fn snapshot(&self) -> Result<Arc<ActiveKeys>, IdentityError> {
        self.active.read().clone().ok_or(IdentityError::NoActiveKey)
    }

    pub fn public_key(&self) -> Result<RsaPublicKey, IdentityError> {
        Ok(self.snapshot()?.pair.public_key().clone())
    }

    pub fn public_key_pem(&self) -> Result<String, IdentityError> {
        Ok(self.snapshot()?.public_pem.clone())
    }

    /// Encrypt to the active public key
    pub fn encrypt(&self, message: &[u8]) -> Result<Ciphertext, IdentityError> {
        let keys = self.snapshot()?;
        Ok(crypto::encrypt(message, keys.pair.public_key(), self.config.padding)?)
    }

    /// Encrypt to someone else's public key
    pub fn encrypt_for<'a>(
        &self,
        message: &[u8],
        recipient: impl Into<PublicKeyInput<'a>>,
    ) -> Result<Ciphertext, IdentityError> {
        Ok(crypto::encrypt(message, recipient, self.config.padding)?)
    }

    /// Decrypt with the active private key
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let keys = self.snapshot()?;
        Ok(crypto::decrypt(ciphertext, keys.pair.private_key(), self.config.padding)?)
    }

    /// Sign with the active private key
    pub fn sign(&self, message: &[u8]) -> Result<SignatureBlob, IdentityError> {
        let keys = self.snapshot()?;
        Ok(crypto::sign(message, keys.pair.private_key())?)
    }

    /// Verify against the active public key
    pub fn verify(&self, message: &[u8], signature: impl AsRef<[u8]>) -> Result<bool, IdentityError> {
        let keys = self.snapshot()?;
        Ok(crypto::verify(message, signature, keys.pair.public_key())?)
    }

    /// Verify against a sender's public key
    pub fn verify_from<'a>(
        &self,
        message: &[u8],
        signature: impl AsRef<[u8]>,
        sender: impl Into<PublicKeyInput<'a>>,
    ) -> Result<bool, IdentityError> {
        Ok(crypto::verify(message, signature, sender)?)
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new(MessagingConfig::default())
    }
}
