//! Outgoing mail.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// A message handed to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers mail.
///
/// Implementations report failures as `VaultError::Delivery`.
pub trait Mailer: Send + Sync {
    fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Keeps sent messages in memory.
#[derive(Debug, Default)]
pub struct OutboxMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub fn messages(&self) -> Vec<MailMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, message: &MailMessage) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| VaultError::Delivery("Outbox poisoned".to_string()))?
            .push(message.clone());
        Ok(())
    }
}
