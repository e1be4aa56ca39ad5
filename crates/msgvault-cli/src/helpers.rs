//! Input and parsing helper functions for the CLI.

use std::io::{self, IsTerminal, Read};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use dialoguer::{Editor, Password};
use secrecy::SecretString;

use crate::errors::CliError;

/// Whether prompts may be shown.
pub fn is_interactive(no_input: bool) -> bool {
    !no_input && io::stdin().is_terminal()
}

fn secret_from_env(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

/// Read a secret from `env_var`, or prompt for it.
///
/// Returns `Ok(None)` when neither is available.
pub fn read_secret(
    env_var: &str,
    prompt: &str,
    interactive: bool,
) -> anyhow::Result<Option<SecretString>> {
    if let Some(secret) = secret_from_env(env_var) {
        return Ok(Some(secret));
    }
    if !interactive {
        return Ok(None);
    }
    let value = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", prompt.to_lowercase(), e))?;
    Ok(Some(SecretString::from(value)))
}

/// Like [`read_secret`] but a secret is mandatory.
pub fn require_secret(env_var: &str, prompt: &str, interactive: bool) -> anyhow::Result<SecretString> {
    read_secret(env_var, prompt, interactive)?.ok_or_else(|| {
        CliError::invalid_input(format!(
            "No {} provided and no TTY available. Set {}.",
            prompt.to_lowercase(),
            env_var
        ))
        .into()
    })
}

/// Read a new secret from `env_var`, or prompt twice for it.
pub fn require_new_secret(
    env_var: &str,
    prompt: &str,
    interactive: bool,
) -> anyhow::Result<SecretString> {
    if let Some(secret) = secret_from_env(env_var) {
        return Ok(secret);
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No {} provided and no TTY available. Set {}.",
            prompt.to_lowercase(),
            env_var
        ))
        .into());
    }
    let value = Password::new()
        .with_prompt(prompt)
        .with_confirmation(format!("Confirm {}", prompt.to_lowercase()), "Entries do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", prompt.to_lowercase(), e))?;
    Ok(SecretString::from(value))
}

/// Read entry content from --content, stdin, or an editor.
pub fn read_content(no_input: bool, content: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = content {
        return Ok(value);
    }

    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        return Ok(buffer.trim_end_matches('\n').to_string());
    }

    if no_input {
        return Err(CliError::invalid_input("--no-input requires --content or content on stdin").into());
    }

    Editor::new()
        .edit("")
        .map_err(|e| anyhow::anyhow!("Failed to launch editor: {}", e))?
        .ok_or_else(|| CliError::invalid_input("Editor closed without saving").into())
}

/// Parse a datetime string (ISO-8601 or YYYY-MM-DD).
pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CliError::invalid_input(format!("Invalid date value: {}", value)))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(CliError::invalid_input(format!(
        "Invalid date/time (expected ISO-8601 or YYYY-MM-DD): {}",
        value
    ))
    .into())
}

/// Parse a duration string (e.g., "7d", "24h").
pub fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    let invalid = |message: String| -> anyhow::Error { CliError::invalid_input(message).into() };

    if value.len() < 2 || !value.is_ascii() {
        return Err(invalid(format!(
            "Invalid duration: {} (expected <number><unit>)",
            value
        )));
    }

    let (num_str, unit) = value.split_at(value.len() - 1);
    let amount: i64 = num_str
        .parse()
        .map_err(|_| invalid(format!("Invalid duration number: {}", value)))?;
    if amount <= 0 {
        return Err(invalid(format!("Duration must be positive: {}", value)));
    }

    let duration = match unit {
        "d" => Duration::try_days(amount),
        "h" => Duration::try_hours(amount),
        "m" => Duration::try_minutes(amount),
        "s" => Duration::try_seconds(amount),
        _ => {
            return Err(invalid(format!(
                "Invalid duration unit: {} (use d/h/m/s)",
                unit
            )))
        }
    };
    duration.ok_or_else(|| invalid(format!("Duration out of range: {}", value)))
}

/// Parse an entry ID.
pub fn parse_entry_id(value: &str) -> anyhow::Result<uuid::Uuid> {
    uuid::Uuid::parse_str(value.trim())
        .map_err(|_| CliError::invalid_input(format!("Invalid entry ID: {}", value)).into())
}
