//! CLI error types for structured error handling.
//!
//! Handlers return `anyhow::Result`; at the top level the error chain is
//! inspected for a [`CliError`] or a core [`VaultError`] to pick the exit
//! code and an optional hint.

use std::fmt;

use msgvault_core::VaultError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found
    NotFound { message: String, hint: String },

    /// Authentication failed (missing or invalid session, wrong secret)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, .. } => write!(f, "{}", message),
            CliError::AuthFailed { message, .. } => write!(f, "{}", message),
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }

    fn hint(&self) -> Option<&str> {
        match self {
            CliError::NotFound { hint, .. } => Some(hint),
            CliError::AuthFailed { hint, .. } => hint.as_deref(),
            CliError::InvalidInput(_) => None,
        }
    }
}

/// Exit code for a core error.
pub fn vault_exit_code(err: &VaultError) -> i32 {
    match err {
        VaultError::Validation(_) => exit_codes::INVALID_INPUT,
        VaultError::NotFound | VaultError::Gone => exit_codes::NOT_FOUND,
        VaultError::AuthenticationFailed | VaultError::InvalidToken => exit_codes::AUTH_FAILED,
        VaultError::TimeLocked { .. } => exit_codes::TIME_LOCKED,
        _ => exit_codes::GENERAL,
    }
}

fn vault_hint(err: &VaultError) -> Option<&'static str> {
    match err {
        VaultError::InvalidToken => {
            Some("Hint: Run `msgvault login` and pass the token with --token or MSGVAULT_TOKEN.")
        }
        VaultError::NotFound => Some("Hint: Run `msgvault list` to see your entry IDs."),
        VaultError::AuthenticationFailed => {
            Some("Hint: Check the passphrase. Set MSGVAULT_PASSPHRASE for non-interactive use.")
        }
        VaultError::Config(_) => Some(
            "Hint: MSGVAULT_MASTER_KEY must be base64 of 32 bytes and MSGVAULT_TOKEN_SECRET at least 32 bytes.",
        ),
        _ => None,
    }
}

/// Pick the exit code for an error chain.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(cli) = cause.downcast_ref::<CliError>() {
            return cli.exit_code();
        }
        if let Some(vault) = cause.downcast_ref::<VaultError>() {
            return vault_exit_code(vault);
        }
    }
    exit_codes::GENERAL
}

/// Pick a hint for an error chain, if one applies.
pub fn hint_for(err: &anyhow::Error) -> Option<String> {
    for cause in err.chain() {
        if let Some(cli) = cause.downcast_ref::<CliError>() {
            return cli.hint().map(String::from);
        }
        if let Some(vault) = cause.downcast_ref::<VaultError>() {
            return vault_hint(vault).map(String::from);
        }
    }
    None
}

/// Print the error (and hint) to stderr and exit with the matching code.
pub fn exit_with(err: &anyhow::Error) -> ! {
    eprintln!("Error: {}", err);
    if let Some(hint) = hint_for(err) {
        eprintln!("{}", hint);
    }
    std::process::exit(exit_code_for(err))
}
