//! Symmetric keys and passphrase-based key derivation.
//!
//! Entry keys come from one of two places: PBKDF2-HMAC-SHA256 over the
//! entry passphrase and salt, or the CSPRNG for system-key entries.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, VaultError};

/// PBKDF2 iteration count.
///
/// Fixed; changing it makes every existing passphrase entry unreadable.
pub const PBKDF2_ROUNDS: u32 = 480_000;

/// Length of a symmetric key in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// Length of the per-entry salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// A 256-bit symmetric key.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecretKey {
    key: [u8; KEY_LENGTH],
}

impl SecretKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Copy key bytes out of a slice, rejecting anything but 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| {
            VaultError::Crypto(format!(
                "Invalid key size: expected {}, got {}",
                KEY_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self { key })
    }

    /// Generate a fresh random key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LENGTH];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

/// Comparison runs in constant time.
impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.key[..].ct_eq(&other.key[..]).into()
    }
}

impl Eq for SecretKey {}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an entry key from a passphrase.
///
/// Same passphrase + salt always produces the same key. An empty passphrase
/// is accepted; callers decide whether it is meaningful.
///
/// # Examples
///
/// ```
/// use msgvault_core::crypto::derive_key;
///
/// let salt = [7u8; 16];
/// let key = derive_key(b"my-passphrase", &salt);
/// assert_eq!(key, derive_key(b"my-passphrase", &salt));
/// ```
pub fn derive_key(passphrase: &[u8], salt: &[u8]) -> SecretKey {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, PBKDF2_ROUNDS, &mut key);
    SecretKey::from_bytes(key)
}

/// Generate a random per-entry salt.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation_deterministic() {
        let salt = b"unique-salt-1234";

        let key1 = derive_key(b"test-passphrase", salt);
        let key2 = derive_key(b"test-passphrase", salt);

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key(b"test-passphrase", b"salt1-1234567890");
        let key2 = derive_key(b"test-passphrase", b"salt2-1234567890");

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let salt = b"fixed-salt-12345";

        let key1 = derive_key(b"passphrase-one", salt);
        let key2 = derive_key(b"passphrase-two", salt);

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_empty_passphrase_accepted() {
        let salt = generate_salt();
        let key = derive_key(b"", &salt);
        assert_ne!(key.as_bytes(), &[0u8; KEY_LENGTH]);
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        assert!(SecretKey::from_slice(&[1u8; 16]).is_err());
        assert!(SecretKey::from_slice(&[1u8; 33]).is_err());
        assert!(SecretKey::from_slice(&[1u8; 32]).is_ok());
    }

    #[test]
    fn test_generated_keys_and_salts_differ() {
        assert_ne!(SecretKey::generate(), SecretKey::generate());
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_keys_differing_in_last_byte_are_unequal() {
        let mut bytes = [5u8; KEY_LENGTH];
        let key = SecretKey::from_slice(&bytes).unwrap();
        assert_eq!(key, SecretKey::from_slice(&bytes).unwrap());

        bytes[KEY_LENGTH - 1] ^= 1;
        assert_ne!(key, SecretKey::from_slice(&bytes).unwrap());
    }

    #[test]
    fn test_secret_key_debug_redacts() {
        let key = derive_key(b"test-passphrase", b"salt-12345678901");

        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }
}
