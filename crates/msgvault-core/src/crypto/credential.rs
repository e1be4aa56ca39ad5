//! Salted verifiers for entry passphrases and account passwords.
//!
//! Verifiers are Argon2id PHC strings (`$argon2id$v=19$...`), so the salt and
//! parameters travel with the hash. Verification compares in constant time.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Result, VaultError};

/// Argon2id parameters.
///
/// - Memory: 19 MB (19 * 1024 KB)
/// - Iterations: 2
/// - Parallelism: 1
const ARGON2_MEMORY_KB: u32 = 19 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

/// Salt length for verifiers in bytes.
const VERIFIER_SALT_LENGTH: usize = 16;

/// Hashes and verifies secrets.
#[derive(Clone)]
pub struct CredentialStore {
    argon2: Argon2<'static>,
}

impl CredentialStore {
    /// Create a credential store with the default Argon2id parameters.
    pub fn new() -> Result<Self> {
        let params = argon2::Params::new(
            ARGON2_MEMORY_KB,
            ARGON2_ITERATIONS,
            ARGON2_PARALLELISM,
            None,
        )
        .map_err(|e| VaultError::Crypto(format!("Failed to create Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        })
    }

    /// Produce a salted verifier for `secret`.
    pub fn hash(&self, secret: &str) -> Result<String> {
        let mut salt_bytes = [0u8; VERIFIER_SALT_LENGTH];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| VaultError::Crypto(format!("Failed to encode salt: {}", e)))?;

        let hash = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| VaultError::Crypto(format!("Hashing failed: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Check `secret` against a verifier produced by [`CredentialStore::hash`].
    ///
    /// Malformed verifiers never match.
    pub fn verify(&self, secret: &str, verifier: &str) -> bool {
        let parsed = match PasswordHash::new(verifier) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };
        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
