//! Cryptographic operations for msgvault.
//!
//! This module provides encryption, key derivation and credential services
//! using well-audited libraries:
//! - **PBKDF2-HMAC-SHA256**: passphrase → entry key (480,000 rounds)
//! - **AES-256-GCM**: authenticated encryption of entry content
//! - **Argon2id**: salted verifiers for passphrases and account passwords
//! - **HMAC-SHA256**: signed bearer tokens
//!
//! ## Security Model
//!
//! - Every entry has its own 16-byte salt and its own content key
//! - Passphrase entries never persist the key, only an Argon2id verifier
//! - System-key entries persist the content key wrapped under the master key
//! - Key material is zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the database file (without the master key)
//! - Offline brute-force attacks on entry passphrases
//!
//! We do NOT defend against:
//! - Theft of the database together with the master key
//! - Online guessing (unlock attempts are not rate limited)

pub mod credential;
pub mod envelope;
pub mod key;
pub mod master;

pub use credential::CredentialStore;
pub use envelope::{decrypt, encrypt, NONCE_SIZE, TAG_SIZE};
pub use key::{derive_key, generate_salt, SecretKey, KEY_LENGTH, PBKDF2_ROUNDS, SALT_LENGTH};
pub use master::MasterKeyVault;
