//! AES-256-GCM authenticated encryption.
//!
//! Ciphertext blobs are self-contained:
//!
//! ```text
//! [ nonce (12 bytes) | ciphertext | tag (16 bytes) ]
//! ```
//!
//! Any failure to open a blob (wrong key, tampering, truncation) is reported
//! as `VaultError::AuthenticationFailed` and never yields partial plaintext.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::crypto::key::SecretKey;
use crate::error::{Result, VaultError};

/// AES-GCM nonce size in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes (128 bits).
pub const TAG_SIZE: usize = 16;

/// Encrypt `plaintext` under `key`.
pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_aad(key, plaintext, b"")
}

/// Decrypt a blob produced by [`encrypt`].
pub fn decrypt(key: &SecretKey, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    decrypt_with_aad(key, blob, b"")
}

/// Encrypt with additional authenticated data bound to the blob.
pub(crate) fn encrypt_with_aad(key: &SecretKey, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Cipher init error: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, Payload { msg: plaintext, aad })
        .map_err(|e| VaultError::Crypto(format!("Encryption error: {}", e)))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a blob, checking the additional authenticated data.
pub(crate) fn decrypt_with_aad(
    key: &SecretKey,
    blob: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(VaultError::AuthenticationFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Cipher init error: {}", e)))?;

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| VaultError::AuthenticationFailed)?;

    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let key = SecretKey::generate();
        let plaintext = b"Hello, World! This is secret data.";

        let blob = encrypt(&key, plaintext).unwrap();
        let decrypted = decrypt(&key, &blob).unwrap();

        assert_eq!(decrypted.as_slice(), plaintext);
    }

    #[test]
    fn test_blob_layout() {
        let key = SecretKey::generate();
        let blob = encrypt(&key, b"abc").unwrap();
        assert_eq!(blob.len(), NONCE_SIZE + 3 + TAG_SIZE);
    }

    #[test]
    fn test_nonce_is_fresh_per_encryption() {
        let key = SecretKey::generate();
        let blob1 = encrypt(&key, b"same plaintext").unwrap();
        let blob2 = encrypt(&key, b"same plaintext").unwrap();
        assert_ne!(blob1, blob2);
    }

    #[test]
    fn test_corrupted_data_fails_decryption() {
        let key = SecretKey::generate();
        let mut blob = encrypt(&key, b"secret data").unwrap();

        let len = blob.len();
        blob[len / 2] ^= 0xFF;

        assert!(matches!(
            decrypt(&key, &blob),
            Err(VaultError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_truncated_blob_fails_decryption() {
        let key = SecretKey::generate();
        let blob = encrypt(&key, b"secret data").unwrap();

        assert!(matches!(
            decrypt(&key, &blob[..NONCE_SIZE + TAG_SIZE - 1]),
            Err(VaultError::AuthenticationFailed)
        ));
        assert!(matches!(
            decrypt(&key, &[]),
            Err(VaultError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_aad_mismatch_fails_decryption() {
        let key = SecretKey::generate();
        let blob = encrypt_with_aad(&key, b"secret", b"context-a").unwrap();

        assert!(decrypt_with_aad(&key, &blob, b"context-a").is_ok());
        assert!(matches!(
            decrypt_with_aad(&key, &blob, b"context-b"),
            Err(VaultError::AuthenticationFailed)
        ));
        assert!(matches!(
            decrypt(&key, &blob),
            Err(VaultError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = SecretKey::generate();
        let blob = encrypt(&key, b"").unwrap();
        assert!(decrypt(&key, &blob).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn wrong_key_never_decrypts(
            key_a in any::<[u8; 32]>(),
            key_b in any::<[u8; 32]>(),
            message in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            prop_assume!(key_a != key_b);
            let blob = encrypt(&SecretKey::from_bytes(key_a), &message).unwrap();
            let result = decrypt(&SecretKey::from_bytes(key_b), &blob);
            prop_assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
        }

        #[test]
        fn encrypt_decrypt_always_roundtrips(
            key in any::<[u8; 32]>(),
            message in proptest::collection::vec(any::<u8>(), 0..1024),
        ) {
            let key = SecretKey::from_bytes(key);
            let blob = encrypt(&key, &message).unwrap();
            let decrypted = decrypt(&key, &blob).unwrap();
            prop_assert_eq!(decrypted.as_slice(), message.as_slice());
        }
    }
}
