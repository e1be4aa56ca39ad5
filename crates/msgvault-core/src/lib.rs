//! # msgvault Core
//!
//! Core library for msgvault - a vault of messages encrypted at rest, each
//! released according to its own policy (time lock, passphrase, single-view
//! self-destruct), behind token-authenticated accounts.
//!
//! This crate provides the encryption and unlock protocol, the entry
//! lifecycle, account services and storage, independent of any front end.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, envelope encryption, master-key wrapping, verifiers
//! - **lifecycle**: entry state machine and post-unlock transitions
//! - **vault**: create, list and unlock operations
//! - **auth**: registration, login, token authentication, password reset
//! - **token**: signed bearer tokens
//! - **storage**: repository traits and the SQLite backend
//! - **mailer**: outgoing mail seam

pub mod auth;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod lifecycle;
pub mod mailer;
pub mod storage;
pub mod token;
pub mod validation;
pub mod vault;

pub use auth::{AccountService, LoginResponse, LoginUser};
pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use clock::ManualClock;
pub use crypto::{CredentialStore, MasterKeyVault, SecretKey};
pub use error::{Result, VaultError};
pub use mailer::{MailMessage, Mailer, OutboxMailer};
pub use storage::{EntryStore, EntrySummary, PrincipalStore, SqliteStorage, UnlockedEntry};
pub use token::TokenIssuer;
pub use vault::{CreateEntryRequest, VaultService};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
