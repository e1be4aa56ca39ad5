//! Core data types for the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::SALT_LENGTH;

/// How an entry's content key is recovered.
///
/// The two modes are mutually exclusive, so the entry carries exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protection {
    /// Key is derived from a passphrase; only its verifier is stored.
    Passphrase { verifier: String },

    /// Key is random and stored wrapped under the master key.
    SystemKey { wrapped_key: Vec<u8> },
}

impl Protection {
    pub fn is_passphrase(&self) -> bool {
        matches!(self, Protection::Passphrase { .. })
    }
}

/// A persisted vault entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEntry {
    /// Unique identifier for this entry
    pub id: Uuid,

    /// Display label (not encrypted)
    pub title: String,

    /// Authenticated ciphertext of the content
    pub cipher_content: Vec<u8>,

    /// Owning principal
    pub created_by: Uuid,

    /// When this entry was created (second precision)
    pub created_at: DateTime<Utc>,

    /// Unlock is refused strictly before this instant
    pub unlock_after: Option<DateTime<Utc>>,

    /// Key recovery mode
    pub protection: Protection,

    /// Per-entry salt, fixed at creation
    pub salt: [u8; SALT_LENGTH],

    /// Delete after the first successful unlock
    pub self_destruct: bool,

    /// Set after the first successful unlock of a kept entry
    pub viewed: bool,
}

impl VaultEntry {
    /// The same entry with the viewed flag set.
    pub fn mark_viewed(&self) -> Self {
        Self {
            viewed: true,
            ..self.clone()
        }
    }
}

/// Builder for creating new entries.
#[derive(Debug, Clone)]
pub struct NewVaultEntry {
    pub title: String,
    pub cipher_content: Vec<u8>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub unlock_after: Option<DateTime<Utc>>,
    pub protection: Protection,
    pub salt: [u8; SALT_LENGTH],
    pub self_destruct: bool,
}

/// List view of an entry. Never carries ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedEntry {
    pub title: String,
    pub content: String,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Builder for creating new accounts.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_viewed_keeps_everything_else() {
        let entry = VaultEntry {
            id: Uuid::new_v4(),
            title: "note".to_string(),
            cipher_content: vec![1, 2, 3],
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            unlock_after: None,
            protection: Protection::SystemKey {
                wrapped_key: vec![4, 5, 6],
            },
            salt: [7u8; SALT_LENGTH],
            self_destruct: false,
            viewed: false,
        };

        let viewed = entry.mark_viewed();
        assert!(viewed.viewed);
        assert!(!entry.viewed);
        assert_eq!(viewed, VaultEntry { viewed: true, ..entry });
    }

    #[test]
    fn test_protection_mode() {
        assert!(Protection::Passphrase {
            verifier: "$argon2id$...".to_string()
        }
        .is_passphrase());
        assert!(!Protection::SystemKey {
            wrapped_key: Vec::new()
        }
        .is_passphrase());
    }
}
