//! End-to-end: wallet signature in, working messaging keys out

use sigkey_core::crypto::{self, EncryptionPadding};
use sigkey_core::identity::{generate_key_pair, KeyLifecycle, KeyStore, Seed, SeededRandomness};
use sigkey_core::wallet::{self, LocalWallet, PersonalSignRecovery, WalletSigner};
use sigkey_core::{MessagingConfig, MessagingNode};
use std::sync::Arc;

const SIGNATURE: &str = "0xdeadbeefcafebabe0123456789abcdef";

fn config() -> MessagingConfig {
    MessagingConfig {
        modulus_bits: 1024,
        acknowledge_signature_derived_keys: true,
        ..Default::default()
    }
}

#[test]
fn hello_world_scenario() {
    sigkey_core::logging::init("warn").unwrap();

    let seed = Seed::derive(SIGNATURE).unwrap();
    let pair = generate_key_pair(&SeededRandomness::new(seed), &config()).unwrap();

    let ciphertext = crypto::encrypt(b"Hello", pair.public_key(), EncryptionPadding::Pkcs1v15).unwrap();
    let plaintext = crypto::decrypt(ciphertext.as_bytes(), pair.private_key(), EncryptionPadding::Pkcs1v15).unwrap();
    assert_eq!(plaintext, b"Hello");

    let signature = crypto::sign(b"Hello", pair.private_key()).unwrap();
    assert!(crypto::verify(b"Hello", &signature, pair.public_key()).unwrap());
    assert!(!crypto::verify(b"World", &signature, pair.public_key()).unwrap());
}

#[test]
fn regenerated_keys_read_old_messages() {
    let sender = MessagingNode::from_signature("sender signature", config()).unwrap();
    let receiver = MessagingNode::from_signature(SIGNATURE, config()).unwrap();

    let receiver_pem = receiver.public_key_pem().unwrap();
    let ciphertext = sender.keys.encrypt_for(b"see you later", &receiver_pem).unwrap();
    let transported = ciphertext.to_base64();

    // The receiver restarts and rebuilds its keys from the same signature
    drop(receiver);
    let restarted = MessagingNode::from_signature(SIGNATURE, config()).unwrap();
    assert_eq!(restarted.public_key_pem().unwrap(), receiver_pem);

    let ciphertext = crypto::Ciphertext::from_base64(&transported).unwrap();
    assert_eq!(restarted.keys.decrypt(ciphertext.as_bytes()).unwrap(), b"see you later");
}

#[test]
fn wallet_signature_drives_key_derivation() {
    let wallet = LocalWallet::random();
    let challenge = b"Sign in to messaging";

    let signature = wallet::sign_message(&wallet, challenge).unwrap();
    let address = wallet.address().to_string();
    assert!(wallet::verify_signature(&PersonalSignRecovery, challenge, &address, &signature.to_hex()).unwrap());

    let from_wallet = KeyStore::new(config());
    from_wallet.generate_from_wallet(&wallet, challenge).unwrap();

    let from_signature = KeyStore::new(config());
    from_signature.generate_from_signature(signature.to_hex()).unwrap();

    assert_eq!(from_wallet.public_key().unwrap(), from_signature.public_key().unwrap());
}

#[test]
fn async_generation_reaches_active_state() {
    let store = Arc::new(KeyStore::new(config()));
    assert_eq!(store.state(), KeyLifecycle::Uninitialized);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime
        .block_on(store.generate_async(SIGNATURE.as_bytes().to_vec()))
        .unwrap();

    assert_eq!(store.state(), KeyLifecycle::Active);
    let ciphertext = store.encrypt(b"Hello").unwrap();
    assert_eq!(store.decrypt(ciphertext.as_bytes()).unwrap(), b"Hello");
}

#[test]
fn acknowledgement_is_required_by_default() {
    let result = MessagingNode::from_signature(SIGNATURE, MessagingConfig::default());
    assert!(result.is_err());
}

#[test]
fn failed_generation_future_reports_error() {
    let store = Arc::new(KeyStore::new(config()));
    let result = tokio_test::block_on(store.generate_async(Vec::new()));
    assert!(result.is_err());
    assert_eq!(store.state(), KeyLifecycle::Uninitialized);
}
