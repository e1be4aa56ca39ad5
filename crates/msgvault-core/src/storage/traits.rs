//! Repository trait definitions.
//!
//! `EntryStore` and `PrincipalStore` define the interface that all storage
//! backends must implement. Methods take `&self`; backends serialize access
//! internally so a store can be shared across threads behind an `Arc`.

use uuid::Uuid;

use super::types::{EntrySummary, NewPrincipal, NewVaultEntry, Principal, VaultEntry};
use crate::error::Result;

/// Persistence for vault entries.
///
/// All implementations must ensure:
/// - Lookups are scoped to the owner; another owner's entry is simply absent
/// - Content, salt and protection are never modified after insert
/// - `delete_entry_if_present` is atomic
pub trait EntryStore: Send + Sync {
    /// Insert a new entry.
    ///
    /// # Returns
    ///
    /// Returns the UUID of the created entry.
    fn insert_entry(&self, entry: &NewVaultEntry) -> Result<Uuid>;

    /// Get an entry by ID, only if owned by `owner`.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(entry))` if found, `Ok(None)` if absent or owned by someone else.
    fn get_entry(&self, id: &Uuid, owner: &Uuid) -> Result<Option<VaultEntry>>;

    /// List the owner's entries, newest first.
    fn list_entries(&self, owner: &Uuid) -> Result<Vec<EntrySummary>>;

    /// Persist the mutable part of an entry (the viewed flag).
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if the entry no longer exists.
    fn update_entry(&self, entry: &VaultEntry) -> Result<()>;

    /// Delete an entry if it still exists and record that it was destroyed.
    ///
    /// # Returns
    ///
    /// Returns `true` only for the caller whose delete removed the row.
    /// Concurrent callers racing on the same entry see `false`.
    fn delete_entry_if_present(&self, id: &Uuid, owner: &Uuid) -> Result<bool>;

    /// Whether `owner` had an entry with this ID that has been destroyed.
    fn is_destroyed(&self, id: &Uuid, owner: &Uuid) -> Result<bool>;
}

/// Persistence for user accounts.
pub trait PrincipalStore: Send + Sync {
    /// Insert a new principal.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Validation` if the username or email is taken.
    fn insert_principal(&self, principal: &NewPrincipal) -> Result<Uuid>;

    /// Get a principal by ID.
    fn get_principal(&self, id: &Uuid) -> Result<Option<Principal>>;

    /// Find a principal by email (case-insensitive).
    fn find_principal_by_email(&self, email: &str) -> Result<Option<Principal>>;

    /// Find a principal by username.
    fn find_principal_by_username(&self, username: &str) -> Result<Option<Principal>>;

    /// Replace a principal's password verifier.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if the principal does not exist.
    fn set_password_hash(&self, id: &Uuid, password_hash: &str) -> Result<()>;
}
