//! Master-key wrapping for system-key entries.
//!
//! Entries created without a passphrase still get their own random content
//! key. That key is stored wrapped (AES-256-GCM) under the process-wide
//! master key, which comes from configuration and is never persisted next to
//! the data. Losing the master key makes every system-key entry unreadable.

use base64::{engine::general_purpose::STANDARD, Engine};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::crypto::envelope::{decrypt_with_aad, encrypt_with_aad};
use crate::crypto::key::{SecretKey, KEY_LENGTH};
use crate::error::{Result, VaultError};

/// Binds wrapped-key blobs to their purpose so they cannot be swapped with
/// content blobs encrypted under the same master key.
const WRAP_AAD: &[u8] = b"msgvault:wrapped-key:v1";

/// Wraps and unwraps per-entry keys under the master key.
pub struct MasterKeyVault {
    master: SecretKey,
}

impl MasterKeyVault {
    /// Create a vault from an already-decoded master key.
    pub fn new(master: SecretKey) -> Self {
        Self { master }
    }

    /// Create a vault from a base64-encoded 32-byte master key.
    pub fn from_base64(encoded: &SecretString) -> Result<Self> {
        let bytes = Zeroizing::new(
            STANDARD
                .decode(encoded.expose_secret().trim())
                .map_err(|e| VaultError::Config(format!("Invalid master key encoding: {}", e)))?,
        );

        if bytes.len() != KEY_LENGTH {
            return Err(VaultError::Config(format!(
                "Master key must decode to exactly {} bytes, got {}",
                KEY_LENGTH,
                bytes.len()
            )));
        }

        Ok(Self::new(SecretKey::from_slice(&bytes)?))
    }

    /// Wrap a per-entry key.
    pub fn wrap(&self, message_key: &SecretKey) -> Result<Vec<u8>> {
        encrypt_with_aad(&self.master, message_key.as_bytes(), WRAP_AAD)
    }

    /// Recover a per-entry key.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::AuthenticationFailed` if the blob was wrapped
    /// under a different master key or was tampered with.
    pub fn unwrap(&self, wrapped_key: &[u8]) -> Result<SecretKey> {
        let bytes = decrypt_with_aad(&self.master, wrapped_key, WRAP_AAD)?;
        SecretKey::from_slice(&bytes).map_err(|_| VaultError::AuthenticationFailed)
    }
}

impl std::fmt::Debug for MasterKeyVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKeyVault")
            .field("master", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(bytes: &[u8]) -> SecretString {
        SecretString::from(STANDARD.encode(bytes))
    }

    #[test]
    fn test_wrap_unwrap_round_trip() {
        let vault = MasterKeyVault::new(SecretKey::generate());
        let message_key = SecretKey::generate();

        let wrapped = vault.wrap(&message_key).unwrap();
        assert_ne!(wrapped.as_slice(), message_key.as_bytes());

        let unwrapped = vault.unwrap(&wrapped).unwrap();
        assert_eq!(unwrapped, message_key);
    }

    #[test]
    fn test_unwrap_with_other_master_fails() {
        let vault_a = MasterKeyVault::new(SecretKey::generate());
        let vault_b = MasterKeyVault::new(SecretKey::generate());

        let wrapped = vault_a.wrap(&SecretKey::generate()).unwrap();
        assert!(matches!(
            vault_b.unwrap(&wrapped),
            Err(VaultError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_content_blob_is_not_a_wrapped_key() {
        let master = SecretKey::generate();
        let vault = MasterKeyVault::new(master.clone());

        let content = crate::crypto::envelope::encrypt(&master, &[9u8; 32]).unwrap();
        assert!(matches!(
            vault.unwrap(&content),
            Err(VaultError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_from_base64() {
        let vault = MasterKeyVault::from_base64(&encoded(&[3u8; 32])).unwrap();
        let key = SecretKey::generate();
        let wrapped = vault.wrap(&key).unwrap();

        let same = MasterKeyVault::from_base64(&encoded(&[3u8; 32])).unwrap();
        assert_eq!(same.unwrap(&wrapped).unwrap(), key);
    }

    #[test]
    fn test_from_base64_rejects_bad_input() {
        assert!(matches!(
            MasterKeyVault::from_base64(&encoded(&[3u8; 16])),
            Err(VaultError::Config(_))
        ));
        assert!(matches!(
            MasterKeyVault::from_base64(&SecretString::from("not base64!".to_string())),
            Err(VaultError::Config(_))
        ));
    }

    #[test]
    fn test_debug_redacts() {
        let vault = MasterKeyVault::new(SecretKey::generate());
        assert!(format!("{:?}", vault).contains("REDACTED"));
    }
}
