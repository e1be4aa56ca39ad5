//! Application context for the msgvault CLI.
//!
//! Provides a unified context that combines CLI arguments with
//! lazily-loaded configuration and storage.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use once_cell::unsync::OnceCell;

use msgvault_core::storage::Principal;
use msgvault_core::{
    AccountService, CredentialStore, SqliteStorage, SystemClock, TokenIssuer, VaultService,
};

use crate::cli::Cli;
use crate::config::{default_db_path, default_outbox_path, load_config, MsgvaultConfig};
use crate::errors::CliError;
use crate::mailer::FileMailer;

use super::secrets::{master_key_vault, token_secret};

/// Application context that bundles CLI args with configuration and storage.
///
/// Each command only pays for what it touches. Listing entries reads storage
/// directly and never needs the master key; resetting a password never needs
/// a session.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<MsgvaultConfig>,
    storage: OnceCell<Arc<SqliteStorage>>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            storage: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&MsgvaultConfig> {
        self.config.get_or_try_init(load_config)
    }

    /// Resolve the database path: `--db`/`MSGVAULT_DB`, then config, then XDG default.
    pub fn db_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.cli.db {
            return Ok(PathBuf::from(path));
        }
        match &self.config()?.storage.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => default_db_path(),
        }
    }

    /// Open the database, creating it on first use.
    pub fn storage(&self) -> anyhow::Result<Arc<SqliteStorage>> {
        self.storage
            .get_or_try_init(|| {
                let path = self.db_path()?;
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        anyhow::anyhow!(
                            "Failed to create data directory {}: {}",
                            parent.display(),
                            e
                        )
                    })?;
                }
                let storage = SqliteStorage::open(&path).map_err(|e| {
                    anyhow::Error::new(e).context(format!("Failed to open {}", path.display()))
                })?;
                Ok::<_, anyhow::Error>(Arc::new(storage))
            })
            .cloned()
    }

    /// Build the vault service. Needs `MSGVAULT_MASTER_KEY`.
    pub fn vault(&self) -> anyhow::Result<VaultService<SqliteStorage>> {
        Ok(VaultService::new(
            self.storage()?,
            master_key_vault()?,
            CredentialStore::new()?,
            Arc::new(SystemClock),
        ))
    }

    /// Build the account service. Needs `MSGVAULT_TOKEN_SECRET`.
    pub fn accounts(&self) -> anyhow::Result<AccountService<SqliteStorage>> {
        let config = self.config()?;
        let clock = Arc::new(SystemClock);
        let ttl = Duration::try_seconds(config.security.token_ttl_seconds).ok_or_else(|| {
            anyhow::anyhow!(
                "token_ttl_seconds out of range: {}",
                config.security.token_ttl_seconds
            )
        })?;
        let tokens = TokenIssuer::new(token_secret()?, ttl, clock.clone())?;

        let outbox = match &config.mail.outbox_path {
            Some(path) => PathBuf::from(path),
            None => default_outbox_path()?,
        };
        let mailer = Arc::new(FileMailer::new(config.mail.from.clone(), outbox));

        Ok(AccountService::new(
            self.storage()?,
            CredentialStore::new()?,
            tokens,
            mailer,
            config.mail.reset_base_url.clone(),
            clock,
        ))
    }

    /// Resolve the session token to the logged-in principal.
    pub fn principal(&self) -> anyhow::Result<Principal> {
        let token = self
            .cli
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                CliError::auth_failed_with_hint(
                    "Not logged in",
                    "Hint: Run `msgvault login` and pass the token with --token or MSGVAULT_TOKEN.",
                )
            })?;
        Ok(self.accounts()?.authenticate(token)?)
    }
}
