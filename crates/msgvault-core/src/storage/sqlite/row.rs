//! Row types for database queries.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::crypto::SALT_LENGTH;
use crate::error::{Result, VaultError};
use crate::storage::types::{EntrySummary, Principal, Protection, VaultEntry};

pub const ENTRY_COLUMNS: &str = "id, title, cipher_content, created_by, created_at, unlock_after, \
     passphrase_hash, salt, wrapped_key, self_destruct, viewed";

pub const PRINCIPAL_COLUMNS: &str = "id, username, email, password_hash, created_at";

/// Timestamps are stored as RFC 3339 strings with second precision.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| VaultError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| VaultError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

/// Raw row data from the entries table, before parsing into domain types.
#[derive(Debug)]
pub struct EntryRow {
    pub id: String,
    pub title: String,
    pub cipher_content: Vec<u8>,
    pub created_by: String,
    pub created_at: String,
    pub unlock_after: Option<String>,
    pub passphrase_hash: String,
    pub salt: Vec<u8>,
    pub wrapped_key: Option<Vec<u8>>,
    pub self_destruct: bool,
    pub viewed: bool,
}

impl EntryRow {
    /// Read a row selected with [`ENTRY_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            cipher_content: row.get(2)?,
            created_by: row.get(3)?,
            created_at: row.get(4)?,
            unlock_after: row.get(5)?,
            passphrase_hash: row.get(6)?,
            salt: row.get(7)?,
            wrapped_key: row.get(8)?,
            self_destruct: row.get(9)?,
            viewed: row.get(10)?,
        })
    }
}

impl TryFrom<EntryRow> for VaultEntry {
    type Error = VaultError;

    fn try_from(row: EntryRow) -> Result<Self> {
        let id = parse_uuid(&row.id, "entry")?;
        let created_by = parse_uuid(&row.created_by, "owner")?;
        let created_at = parse_timestamp(&row.created_at)?;
        let unlock_after = row
            .unlock_after
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;
        let salt: [u8; SALT_LENGTH] = row.salt.as_slice().try_into().map_err(|_| {
            VaultError::Storage(format!(
                "Invalid salt length for entry {}: {}",
                id,
                row.salt.len()
            ))
        })?;

        let protection = match (row.passphrase_hash.is_empty(), row.wrapped_key) {
            (false, None) => Protection::Passphrase {
                verifier: row.passphrase_hash,
            },
            (true, Some(wrapped_key)) => Protection::SystemKey { wrapped_key },
            _ => {
                return Err(VaultError::Storage(format!(
                    "Entry {} has inconsistent protection",
                    id
                )))
            }
        };

        Ok(VaultEntry {
            id,
            title: row.title,
            cipher_content: row.cipher_content,
            created_by,
            created_at,
            unlock_after,
            protection,
            salt,
            self_destruct: row.self_destruct,
            viewed: row.viewed,
        })
    }
}

/// Raw row data for the list view.
#[derive(Debug)]
pub struct SummaryRow {
    pub id: String,
    pub title: String,
    pub created_at: String,
}

impl TryFrom<SummaryRow> for EntrySummary {
    type Error = VaultError;

    fn try_from(row: SummaryRow) -> Result<Self> {
        Ok(EntrySummary {
            id: parse_uuid(&row.id, "entry")?,
            title: row.title,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Raw row data from the users table.
#[derive(Debug)]
pub struct PrincipalRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl PrincipalRow {
    /// Read a row selected with [`PRINCIPAL_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = VaultError;

    fn try_from(row: PrincipalRow) -> Result<Self> {
        Ok(Principal {
            id: parse_uuid(&row.id, "user")?,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}
