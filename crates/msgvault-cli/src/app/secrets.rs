//! Process-wide secrets, read from the environment only.

use secrecy::SecretString;

use msgvault_core::{MasterKeyVault, VaultError};

use crate::constants::env_vars;

fn env_secret(var: &str) -> anyhow::Result<SecretString> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => Err(VaultError::Config(format!("{} is not set", var)).into()),
    }
}

/// Master key for system-key entries (`MSGVAULT_MASTER_KEY`, base64 of 32 bytes).
pub fn master_key_vault() -> anyhow::Result<MasterKeyVault> {
    let encoded = env_secret(env_vars::MASTER_KEY)?;
    Ok(MasterKeyVault::from_base64(&encoded)?)
}

/// Token signing secret (`MSGVAULT_TOKEN_SECRET`).
pub fn token_secret() -> anyhow::Result<SecretString> {
    env_secret(env_vars::TOKEN_SECRET)
}
