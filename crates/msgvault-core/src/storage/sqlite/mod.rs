//! SQLite storage backend.
//!
//! A single database file holds entries, destruction tombstones and user
//! accounts. Entry content is already ciphertext when it reaches this layer;
//! the backend never sees keys or plaintext.

mod row;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use crate::error::{Result, VaultError};
use crate::storage::traits::{EntryStore, PrincipalStore};
use crate::storage::types::{
    EntrySummary, NewPrincipal, NewVaultEntry, Principal, Protection, VaultEntry,
};

use row::{
    format_timestamp, EntryRow, PrincipalRow, SummaryRow, ENTRY_COLUMNS, PRINCIPAL_COLUMNS,
};

/// On-disk schema version recorded in the `meta` table.
pub const FORMAT_VERSION: &str = "1";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        cipher_content BLOB NOT NULL,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL,
        unlock_after TEXT,
        passphrase_hash TEXT NOT NULL DEFAULT '',
        salt BLOB NOT NULL,
        wrapped_key BLOB,
        self_destruct INTEGER NOT NULL DEFAULT 0,
        viewed INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_entries_owner_created
        ON entries(created_by, created_at);

    CREATE TABLE IF NOT EXISTS destroyed_entries (
        id TEXT PRIMARY KEY,
        owner TEXT NOT NULL,
        destroyed_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
"#;

/// SQLite-backed entry and principal store.
pub struct SqliteStorage {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self::init(conn, Some(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "opened vault database");
        Ok(storage)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?)",
            [FORMAT_VERSION],
        )?;

        let version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        if version != FORMAT_VERSION {
            return Err(VaultError::Storage(format!(
                "Unsupported database format version: {}",
                version
            )));
        }

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Storage("SQLite connection poisoned".to_string()))
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl EntryStore for SqliteStorage {
    fn insert_entry(&self, entry: &NewVaultEntry) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let (passphrase_hash, wrapped_key) = match &entry.protection {
            Protection::Passphrase { verifier } => (verifier.as_str(), None),
            Protection::SystemKey { wrapped_key } => ("", Some(wrapped_key.as_slice())),
        };

        let conn = self.lock_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO entries ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
                ENTRY_COLUMNS
            ),
            (
                id.to_string(),
                &entry.title,
                &entry.cipher_content,
                entry.created_by.to_string(),
                format_timestamp(&entry.created_at),
                entry.unlock_after.as_ref().map(format_timestamp),
                passphrase_hash,
                entry.salt.as_slice(),
                wrapped_key,
                entry.self_destruct,
            ),
        )?;

        Ok(id)
    }

    fn get_entry(&self, id: &Uuid, owner: &Uuid) -> Result<Option<VaultEntry>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM entries WHERE id = ? AND created_by = ?",
                    ENTRY_COLUMNS
                ),
                (id.to_string(), owner.to_string()),
                EntryRow::from_row,
            )
            .optional()?;

        row.map(VaultEntry::try_from).transpose()
    }

    fn list_entries(&self, owner: &Uuid) -> Result<Vec<EntrySummary>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, created_at FROM entries \
             WHERE created_by = ? ORDER BY created_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map([owner.to_string()], |row| {
            Ok(SummaryRow {
                id: row.get(0)?,
                title: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?.try_into()?);
        }
        Ok(summaries)
    }

    fn update_entry(&self, entry: &VaultEntry) -> Result<()> {
        let conn = self.lock_conn()?;
        let updated = conn.execute(
            "UPDATE entries SET viewed = ? WHERE id = ? AND created_by = ?",
            (
                entry.viewed,
                entry.id.to_string(),
                entry.created_by.to_string(),
            ),
        )?;

        if updated == 0 {
            return Err(VaultError::NotFound);
        }
        Ok(())
    }

    fn delete_entry_if_present(&self, id: &Uuid, owner: &Uuid) -> Result<bool> {
        let mut conn = self.lock_conn()?;
        // IMMEDIATE takes the write lock up front so two processes sharing the
        // file cannot both observe the row before deleting it.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let removed = tx.execute(
            "DELETE FROM entries WHERE id = ? AND created_by = ?",
            (id.to_string(), owner.to_string()),
        )?;

        if removed == 1 {
            tx.execute(
                "INSERT OR IGNORE INTO destroyed_entries (id, owner, destroyed_at) \
                 VALUES (?, ?, ?)",
                (
                    id.to_string(),
                    owner.to_string(),
                    format_timestamp(&Utc::now()),
                ),
            )?;
        }

        tx.commit()?;
        Ok(removed == 1)
    }

    fn is_destroyed(&self, id: &Uuid, owner: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM destroyed_entries WHERE id = ? AND owner = ?",
                (id.to_string(), owner.to_string()),
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl PrincipalStore for SqliteStorage {
    fn insert_principal(&self, principal: &NewPrincipal) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let conn = self.lock_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO users ({}) VALUES (?, ?, ?, ?, ?)",
                PRINCIPAL_COLUMNS
            ),
            (
                id.to_string(),
                &principal.username,
                &principal.email,
                &principal.password_hash,
                format_timestamp(&principal.created_at),
            ),
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                VaultError::validation("username or email already registered")
            } else {
                e.into()
            }
        })?;

        Ok(id)
    }

    fn get_principal(&self, id: &Uuid) -> Result<Option<Principal>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", PRINCIPAL_COLUMNS),
                [id.to_string()],
                PrincipalRow::from_row,
            )
            .optional()?;
        row.map(Principal::try_from).transpose()
    }

    fn find_principal_by_email(&self, email: &str) -> Result<Option<Principal>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM users WHERE email = ? COLLATE NOCASE",
                    PRINCIPAL_COLUMNS
                ),
                [email],
                PrincipalRow::from_row,
            )
            .optional()?;
        row.map(Principal::try_from).transpose()
    }

    fn find_principal_by_username(&self, username: &str) -> Result<Option<Principal>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?", PRINCIPAL_COLUMNS),
                [username],
                PrincipalRow::from_row,
            )
            .optional()?;
        row.map(Principal::try_from).transpose()
    }

    fn set_password_hash(&self, id: &Uuid, password_hash: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let updated = conn.execute(
            "UPDATE users SET password_hash = ? WHERE id = ?",
            (password_hash, id.to_string()),
        )?;
        if updated == 0 {
            return Err(VaultError::NotFound);
        }
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
