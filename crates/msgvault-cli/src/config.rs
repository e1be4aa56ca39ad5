use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use msgvault_core::token::DEFAULT_TOKEN_TTL_SECONDS;

use crate::constants::{env_vars, DEFAULT_MAIL_FROM, DEFAULT_RESET_BASE_URL};
use crate::errors::CliError;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MsgvaultConfig {
    pub storage: StorageSection,
    pub security: SecuritySection,
    pub mail: MailSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub token_ttl_seconds: i64,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSection {
    pub from: String,
    pub outbox_path: Option<String>,
    pub reset_base_url: String,
}

impl Default for MailSection {
    fn default() -> Self {
        Self {
            from: DEFAULT_MAIL_FROM.to_string(),
            outbox_path: None,
            reset_base_url: DEFAULT_RESET_BASE_URL.to_string(),
        }
    }
}

/// Config path named by MSGVAULT_CONFIG, if set.
fn explicit_config_path() -> Option<PathBuf> {
    std::env::var(env_vars::CONFIG)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// Load the config file.
///
/// A missing default config means defaults; a missing MSGVAULT_CONFIG file
/// is an error.
pub fn load_config() -> anyhow::Result<MsgvaultConfig> {
    if let Some(path) = explicit_config_path() {
        if !path.exists() {
            return Err(CliError::not_found(
                format!("No config found at {}", path.display()),
                "Hint: Unset MSGVAULT_CONFIG to use the default location.",
            )
            .into());
        }
        return read_config(&path);
    }

    let path = default_config_path()?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(MsgvaultConfig::default());
    }
    read_config(&path)
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_db_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("vault.db"))
}

pub fn default_outbox_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("outbox.jsonl"))
}

pub fn read_config(path: &Path) -> anyhow::Result<MsgvaultConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("msgvault"));
        }
    }
    Ok(home_dir()?.join(".config").join("msgvault"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("msgvault"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("msgvault"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
