//! File-backed outbox for outgoing mail.
//!
//! Each message is appended to a JSON Lines file that a relay (or a person)
//! can pick up. The CLI has no SMTP client of its own.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use msgvault_core::{MailMessage, Mailer, Result, VaultError};

/// One line of the outbox file.
#[derive(Debug, Serialize, Deserialize)]
pub struct OutboxRecord {
    pub from: String,
    pub sent_at: DateTime<Utc>,
    #[serde(flatten)]
    pub message: MailMessage,
}

/// Appends messages to a JSON Lines outbox file.
#[derive(Debug)]
pub struct FileMailer {
    from: String,
    path: PathBuf,
}

impl FileMailer {
    pub fn new(from: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            path: path.into(),
        }
    }
}

impl Mailer for FileMailer {
    fn send(&self, message: &MailMessage) -> Result<()> {
        let delivery = |e: std::io::Error| {
            VaultError::Delivery(format!("{}: {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(delivery)?;
        }

        let record = OutboxRecord {
            from: self.from.clone(),
            sent_at: Utc::now(),
            message: message.clone(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(delivery)?;
        file.write_all(line.as_bytes()).map_err(delivery)?;

        tracing::debug!(outbox = %self.path.display(), "queued outgoing mail");
        Ok(())
    }
}
