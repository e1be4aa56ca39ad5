//! Vault entry lifecycle.
//!
//! ```text
//!   create ──► Locked(t) ──(now >= t)──► Unlockable ──unlock──► Viewed ──unlock──► Viewed
//!                                            │
//!                                            └──unlock (self-destruct)──► Destroyed
//! ```
//!
//! These functions are pure: they inspect an entry and the current time and
//! say what is allowed and what must happen next. Persisting the outcome is
//! the caller's job.

use chrono::{DateTime, Utc};

use crate::error::{Result, VaultError};
use crate::storage::types::VaultEntry;

/// Where an entry sits in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Unlock is refused until the contained instant
    Locked(DateTime<Utc>),
    /// Never unlocked and not time-locked
    Unlockable,
    /// Unlocked before; still unlockable
    Viewed,
    /// A self-destruct entry that has already been read
    Destroyed,
}

/// Classify an entry at `now`.
pub fn state_of(entry: &VaultEntry, now: DateTime<Utc>) -> EntryState {
    if entry.self_destruct && entry.viewed {
        return EntryState::Destroyed;
    }
    match entry.unlock_after {
        Some(at) if now < at => EntryState::Locked(at),
        _ if entry.viewed => EntryState::Viewed,
        _ => EntryState::Unlockable,
    }
}

/// Check whether an unlock attempt may proceed to credential verification.
///
/// # Errors
///
/// - `VaultError::Gone` for a self-destruct entry that was already read
/// - `VaultError::TimeLocked` before the unlock time
pub fn check_unlockable(entry: &VaultEntry, now: DateTime<Utc>) -> Result<()> {
    match state_of(entry, now) {
        EntryState::Destroyed => Err(VaultError::Gone),
        EntryState::Locked(unlock_after) => Err(VaultError::TimeLocked { unlock_after }),
        EntryState::Unlockable | EntryState::Viewed => Ok(()),
    }
}

/// What to persist after a successful decrypt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockTransition {
    /// Delete the entry; content may only be released if the delete won
    Destroy,
    /// Store the entry with its viewed flag set
    MarkViewed(VaultEntry),
}

/// Decide the side effect of a successful unlock.
pub fn after_unlock(entry: &VaultEntry) -> UnlockTransition {
    if entry.self_destruct {
        UnlockTransition::Destroy
    } else {
        UnlockTransition::MarkViewed(entry.mark_viewed())
    }
}
