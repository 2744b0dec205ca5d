//! Wallet Module - Ethereum style wallet signatures
//!
//! Messages are signed with EIP-191 `personal_sign` over secp256k1.
//! Verification recovers the signer address from the raw message and
//! compares it with the claimed one.

use alloy_primitives::{keccak256, Signature};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

pub use alloy_primitives::Address;

pub const WALLET_SIGNATURE_LENGTH: usize = 65;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Address recovery failed: {0}")]
    Recovery(String),
}

/// Recoverable secp256k1 signature: `r || s || v`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WalletSignature(Signature);

impl WalletSignature {
    /// Accepts `v` as 0/1 or 27/28
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        if bytes.len() != WALLET_SIGNATURE_LENGTH {
            return Err(WalletError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                WALLET_SIGNATURE_LENGTH,
                bytes.len()
            )));
        }
        let signature =
            Signature::from_raw(bytes).map_err(|e| WalletError::InvalidSignature(e.to_string()))?;
        Ok(Self(signature))
    }

    pub fn from_hex(s: &str) -> Result<Self, WalletError> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| WalletError::InvalidSignature(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Raw bytes with `v` as 27/28
    pub fn to_bytes(&self) -> [u8; WALLET_SIGNATURE_LENGTH] {
        self.0.as_bytes()
    }

    /// `0x` prefixed lowercase hex, as wallets return it
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    pub fn inner(&self) -> &Signature {
        &self.0
    }
}

impl From<Signature> for WalletSignature {
    fn from(signature: Signature) -> Self {
        Self(signature)
    }
}

impl fmt::Debug for WalletSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletSignature({})", self.to_hex())
    }
}

/// Something that can produce personal-sign signatures for an account
pub trait WalletSigner {
    fn address(&self) -> Address;

    fn sign_personal(&self, message: &[u8]) -> Result<WalletSignature, WalletError>;
}

/// Something that can recover the signing address of a personal-sign signature
pub trait AddressRecovery {
    fn recover_address(
        &self,
        message: &[u8],
        signature: &WalletSignature,
    ) -> Result<Address, WalletError>;
}

/// Recovery with secp256k1 public key recovery over the EIP-191 hash
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalSignRecovery;

impl AddressRecovery for PersonalSignRecovery {
    fn recover_address(
        &self,
        message: &[u8],
        signature: &WalletSignature,
    ) -> Result<Address, WalletError> {
        signature
            .inner()
            .recover_address_from_msg(message)
            .map_err(|e| WalletError::Recovery(e.to_string()))
    }
}

/// In-process secp256k1 wallet
#[derive(Clone)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
}

impl LocalWallet {
    pub fn random() -> Self {
        loop {
            let mut secret = Zeroizing::new([0u8; 32]);
            OsRng.fill_bytes(secret.as_mut());
            // Out of range scalars are redrawn
            if let Ok(wallet) = Self::from_bytes(secret.as_ref()) {
                return wallet;
            }
        }
    }

    pub fn from_bytes(secret: &[u8]) -> Result<Self, WalletError> {
        let signer =
            PrivateKeySigner::from_slice(secret).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        Ok(Self { signer })
    }
}

impl WalletSigner for LocalWallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    fn sign_personal(&self, message: &[u8]) -> Result<WalletSignature, WalletError> {
        self.signer
            .sign_message_sync(message)
            .map(WalletSignature::from)
            .map_err(|e| WalletError::Signing(e.to_string()))
    }
}

impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalWallet({})", self.address())
    }
}

/// Hex Keccak-256 digest of a message (no `0x` prefix)
pub fn hash_message(message: impl AsRef<[u8]>) -> String {
    hex::encode(keccak256(message.as_ref()))
}

/// Personal-sign `message` with `wallet`
pub fn sign_message<W: WalletSigner + ?Sized>(
    wallet: &W,
    message: &[u8],
) -> Result<WalletSignature, WalletError> {
    wallet.sign_personal(message)
}

/// Check that `signature` is a personal-sign signature of `message` by
/// `address`.
///
/// A well-formed signature from another account is `Ok(false)`; a malformed
/// address or signature is an error.
pub fn verify_signature<R: AddressRecovery + ?Sized>(
    recovery: &R,
    message: &[u8],
    address: &str,
    signature: &str,
) -> Result<bool, WalletError> {
    let claimed: Address = address
        .trim()
        .parse()
        .map_err(|e| WalletError::InvalidAddress(format!("{}", e)))?;
    let signature = WalletSignature::from_hex(signature)?;

    tracing::debug!("Verifying wallet signature on {}", claimed);
    let recovered = recovery.recover_address(message, &signature)?;
    tracing::debug!("Recovered address: {}", recovered);

    Ok(recovered == claimed)
}
