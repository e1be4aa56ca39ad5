//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2+: Application-specific errors
pub mod exit_codes {
    /// Unhandled or operational error.
    pub const GENERAL: i32 = 1;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 2;

    /// Entry or account not found, or entry already destroyed.
    pub const NOT_FOUND: i32 = 3;

    /// Wrong passphrase, bad credentials or invalid session token.
    pub const AUTH_FAILED: i32 = 4;

    /// Entry is time-locked.
    pub const TIME_LOCKED: i32 = 5;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    pub const CONFIG: &str = "MSGVAULT_CONFIG";
    pub const MASTER_KEY: &str = "MSGVAULT_MASTER_KEY";
    pub const TOKEN_SECRET: &str = "MSGVAULT_TOKEN_SECRET";
    pub const PASSWORD: &str = "MSGVAULT_PASSWORD";
    pub const PASSPHRASE: &str = "MSGVAULT_PASSPHRASE";
    pub const LOG: &str = "MSGVAULT_LOG";
}

/// Default log filter when `MSGVAULT_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default base URL for password reset links.
pub const DEFAULT_RESET_BASE_URL: &str = "http://localhost:8000/reset-password";

/// Default sender for outgoing mail.
pub const DEFAULT_MAIL_FROM: &str = "msgvault@localhost";
