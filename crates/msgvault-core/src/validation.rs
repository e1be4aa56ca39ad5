//! Input validation.
//!
//! Every check here runs before any key generation, hashing or persistence.

use chrono::{DateTime, Datelike, Utc};

use crate::clock::truncate_to_seconds;
use crate::error::{Result, VaultError};

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum username length in characters.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Minimum account password length in characters.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Latest year an unlock time may fall in; stored timestamps are four-digit
/// RFC 3339.
pub const MAX_UNLOCK_YEAR: i32 = 9999;

/// Validate an entry title and return it trimmed.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(VaultError::validation("Title cannot be empty"));
    }

    let length = trimmed.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(VaultError::validation(format!(
            "Title must be at most {} characters (got {})",
            MAX_TITLE_LENGTH, length
        )));
    }

    Ok(trimmed.to_string())
}

/// Content is stored exactly as given, but must not be blank.
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(VaultError::validation("Content cannot be empty"));
    }
    Ok(())
}

/// Validate an optional unlock time against `now`.
///
/// # Returns
///
/// Returns the time truncated to second precision, which is what gets stored.
///
/// # Errors
///
/// Returns `VaultError::Validation` unless the stored instant is strictly
/// later than `now` and no later than the end of year 9999.
pub fn validate_unlock_after(
    unlock_after: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    match unlock_after.map(truncate_to_seconds) {
        Some(at) if at <= now => Err(VaultError::validation(
            "Unlock time must be in the future.",
        )),
        Some(at) if at.year() > MAX_UNLOCK_YEAR => Err(VaultError::validation(format!(
            "Unlock time must be no later than the year {}.",
            MAX_UNLOCK_YEAR
        ))),
        other => Ok(other),
    }
}

/// Treat an empty passphrase exactly like an absent one.
pub fn normalize_passphrase(passphrase: Option<&str>) -> Option<&str> {
    passphrase.filter(|p| !p.is_empty())
}

/// Validate a username and return it trimmed.
pub fn validate_username(username: &str) -> Result<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(VaultError::validation("Username cannot be empty"));
    }
    if trimmed.chars().count() > MAX_USERNAME_LENGTH {
        return Err(VaultError::validation(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate an email address (`local@domain.tld`) and return it trimmed.
pub fn validate_email(email: &str) -> Result<String> {
    let trimmed = email.trim();
    let invalid = || VaultError::validation("Enter a valid email address.");

    let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || host.starts_with('.') || tld.len() < 2 {
        return Err(invalid());
    }

    Ok(trimmed.to_string())
}

/// Validate an account password.
///
/// # Requirements
///
/// - At least 8 characters long
/// - Not empty or only whitespace
///
/// # Examples
///
/// ```
/// use msgvault_core::validation::validate_password;
///
/// assert!(validate_password("my-secure-password-123").is_ok());
/// assert!(validate_password("short").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(VaultError::validation("Password cannot be empty"));
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(VaultError::validation(format!(
            "Password must be at least {} characters (got {})",
            MIN_PASSWORD_LENGTH, length
        )));
    }

    Ok(())
}
