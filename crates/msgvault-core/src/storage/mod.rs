//! Storage layer: repository traits, domain types and the SQLite backend.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStorage;
pub use traits::{EntryStore, PrincipalStore};
pub use types::{
    EntrySummary, NewPrincipal, NewVaultEntry, Principal, Protection, UnlockedEntry, VaultEntry,
};
