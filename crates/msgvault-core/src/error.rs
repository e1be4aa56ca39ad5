//! Error types for msgvault core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! The unlock-facing variants are deliberately coarse: callers must not be
//! able to tell a wrong passphrase from corrupted data, or a missing entry
//! from somebody else's entry.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for msgvault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for msgvault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Malformed input, rejected before any crypto or persistence work
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entry exists but may not be unlocked yet
    #[error("Available after {unlock_after}")]
    TimeLocked { unlock_after: DateTime<Utc> },

    /// Wrong passphrase, wrong key or tampered ciphertext
    #[error("Decryption failed - invalid credentials")]
    AuthenticationFailed,

    /// Entry was destroyed after being read
    #[error("Message has been destroyed")]
    Gone,

    /// Entry is absent or not owned by the caller
    #[error("Not found")]
    NotFound,

    /// Bearer token is malformed, forged or expired
    #[error("Invalid token")]
    InvalidToken,

    /// Cryptographic failure unrelated to credentials (bad key length, RNG)
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Missing or malformed configuration (master key, token secret)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Outgoing mail could not be delivered
    #[error("Mail delivery failed: {0}")]
    Delivery(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl VaultError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        VaultError::Validation(message.into())
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        VaultError::Storage(err.to_string())
    }
}
