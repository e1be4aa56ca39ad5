//! Vault entry operations: create, list and unlock.
//!
//! # Unlock protocol
//!
//! 1. Load the entry scoped to the owner (absent → `Gone` if the owner's
//!    entry was destroyed, otherwise `NotFound`)
//! 2. Lifecycle check: destroyed, then time lock
//! 3. Credential check: passphrase verifier, or master-key unwrap
//! 4. Decrypt
//! 5. Persist the transition; a self-destruct entry's content is released
//!    only to the caller whose conditional delete removed the row
//!
//! Nothing is mutated unless every earlier step succeeded.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::clock::Clock;
use crate::crypto::{decrypt, derive_key, encrypt, generate_salt, CredentialStore, MasterKeyVault, SecretKey};
use crate::error::{Result, VaultError};
use crate::lifecycle::{after_unlock, check_unlockable, UnlockTransition};
use crate::storage::traits::EntryStore;
use crate::storage::types::{EntrySummary, NewVaultEntry, Protection, UnlockedEntry};
use crate::validation::{normalize_passphrase, validate_content, validate_title, validate_unlock_after};

/// Input for [`VaultService::create_entry`].
#[derive(Clone, Default)]
pub struct CreateEntryRequest {
    pub title: String,
    pub content: String,
    /// `None` or empty selects system-key mode
    pub passphrase: Option<String>,
    pub unlock_after: Option<DateTime<Utc>>,
    pub self_destruct: bool,
}

impl std::fmt::Debug for CreateEntryRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateEntryRequest")
            .field("title", &self.title)
            .field("content", &"[REDACTED]")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("unlock_after", &self.unlock_after)
            .field("self_destruct", &self.self_destruct)
            .finish()
    }
}

/// Creates, lists and unlocks vault entries.
pub struct VaultService<S> {
    store: Arc<S>,
    master: MasterKeyVault,
    credentials: CredentialStore,
    clock: Arc<dyn Clock>,
}

impl<S: EntryStore> VaultService<S> {
    pub fn new(
        store: Arc<S>,
        master: MasterKeyVault,
        credentials: CredentialStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            master,
            credentials,
            clock,
        }
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Encrypt and persist a new entry owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Validation` for a blank title or content, a title
    /// over 100 characters, or an unlock time that is not in the future.
    pub fn create_entry(&self, owner: &Uuid, request: &CreateEntryRequest) -> Result<Uuid> {
        let now = self.clock.now();
        let title = validate_title(&request.title)?;
        validate_content(&request.content)?;
        let unlock_after = validate_unlock_after(request.unlock_after, now)?;

        let salt = generate_salt();
        let (key, protection) = match normalize_passphrase(request.passphrase.as_deref()) {
            Some(passphrase) => {
                let verifier = self.credentials.hash(passphrase)?;
                (
                    derive_key(passphrase.as_bytes(), &salt),
                    Protection::Passphrase { verifier },
                )
            }
            None => {
                let key = SecretKey::generate();
                let wrapped_key = self.master.wrap(&key)?;
                (key, Protection::SystemKey { wrapped_key })
            }
        };

        let cipher_content = encrypt(&key, request.content.as_bytes())?;
        let passphrase_protected = protection.is_passphrase();

        let id = self.store.insert_entry(&NewVaultEntry {
            title,
            cipher_content,
            created_by: *owner,
            created_at: crate::clock::truncate_to_seconds(now),
            unlock_after,
            protection,
            salt,
            self_destruct: request.self_destruct,
        })?;

        tracing::info!(
            entry_id = %id,
            owner = %owner,
            passphrase_protected,
            self_destruct = request.self_destruct,
            time_locked = unlock_after.is_some(),
            "created vault entry"
        );
        Ok(id)
    }

    /// The owner's entries, newest first.
    pub fn list_entries(&self, owner: &Uuid) -> Result<Vec<EntrySummary>> {
        self.store.list_entries(owner)
    }

    /// Unlock an entry and apply its post-unlock transition.
    ///
    /// `passphrase` is ignored for system-key entries.
    ///
    /// # Errors
    ///
    /// - `VaultError::NotFound` if the entry is absent or owned by someone else
    /// - `VaultError::Gone` if the owner's self-destruct entry was already read
    /// - `VaultError::TimeLocked` before the entry's unlock time
    /// - `VaultError::AuthenticationFailed` for a wrong or missing passphrase
    ///   or a ciphertext that does not authenticate
    pub fn unlock_entry(
        &self,
        owner: &Uuid,
        id: &Uuid,
        passphrase: Option<&str>,
    ) -> Result<UnlockedEntry> {
        let entry = match self.store.get_entry(id, owner)? {
            Some(entry) => entry,
            None if self.store.is_destroyed(id, owner)? => return Err(VaultError::Gone),
            None => return Err(VaultError::NotFound),
        };

        check_unlockable(&entry, self.clock.now()).inspect_err(|e| {
            tracing::debug!(entry_id = %id, error = %e, "unlock refused");
        })?;

        let key = match &entry.protection {
            Protection::Passphrase { verifier } => {
                let passphrase = normalize_passphrase(passphrase)
                    .filter(|p| self.credentials.verify(p, verifier))
                    .ok_or_else(|| {
                        tracing::warn!(entry_id = %id, "unlock failed: passphrase mismatch");
                        VaultError::AuthenticationFailed
                    })?;
                derive_key(passphrase.as_bytes(), &entry.salt)
            }
            Protection::SystemKey { wrapped_key } => self.master.unwrap(wrapped_key)?,
        };

        let plaintext = decrypt(&key, &entry.cipher_content).inspect_err(|_| {
            tracing::warn!(entry_id = %id, "unlock failed: ciphertext did not authenticate");
        })?;
        let content = std::str::from_utf8(&plaintext)
            .map_err(|_| VaultError::AuthenticationFailed)?
            .to_string();

        match after_unlock(&entry) {
            UnlockTransition::Destroy => {
                if !self.store.delete_entry_if_present(id, owner)? {
                    tracing::debug!(entry_id = %id, "lost self-destruct race");
                    return Err(VaultError::Gone);
                }
                tracing::info!(entry_id = %id, "destroyed self-destruct entry after unlock");
            }
            UnlockTransition::MarkViewed(updated) => {
                if !entry.viewed {
                    self.store.update_entry(&updated)?;
                }
                tracing::info!(entry_id = %id, "unlocked vault entry");
            }
        }

        Ok(UnlockedEntry {
            title: entry.title,
            content,
        })
    }
}

impl<S> std::fmt::Debug for VaultService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultService")
            .field("master", &self.master)
            .finish_non_exhaustive()
    }
}
