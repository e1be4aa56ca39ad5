//! Accounts: registration, login, session authentication and password reset.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::crypto::CredentialStore;
use crate::error::{Result, VaultError};
use crate::mailer::{MailMessage, Mailer};
use crate::storage::traits::PrincipalStore;
use crate::storage::types::{NewPrincipal, Principal};
use crate::token::TokenIssuer;
use crate::validation::{validate_email, validate_password, validate_username};

/// Subject line of password reset mail.
pub const RESET_MAIL_SUBJECT: &str = "Password Reset Request";

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub user: LoginUser,
}

/// Public profile returned with a login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    pub name: String,
    pub email: String,
}

/// Registers principals, issues sessions and runs the password reset flow.
pub struct AccountService<S> {
    store: Arc<S>,
    credentials: CredentialStore,
    tokens: TokenIssuer,
    mailer: Arc<dyn Mailer>,
    reset_base_url: String,
    clock: Arc<dyn Clock>,
}

impl<S: PrincipalStore> AccountService<S> {
    pub fn new(
        store: Arc<S>,
        credentials: CredentialStore,
        tokens: TokenIssuer,
        mailer: Arc<dyn Mailer>,
        reset_base_url: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            credentials,
            tokens,
            mailer,
            reset_base_url: reset_base_url.into(),
            clock,
        }
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Validation` for malformed input or a taken
    /// email or username.
    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<Principal> {
        let username = validate_username(username)?;
        let email = validate_email(email)?;
        validate_password(password)?;

        if self.store.find_principal_by_email(&email)?.is_some() {
            return Err(VaultError::validation("user with this email already exists."));
        }
        if self.store.find_principal_by_username(&username)?.is_some() {
            return Err(VaultError::validation(
                "user with this username already exists.",
            ));
        }

        let new = NewPrincipal {
            username,
            email,
            password_hash: self.credentials.hash(password)?,
            created_at: crate::clock::truncate_to_seconds(self.clock.now()),
        };
        let id = self.store.insert_principal(&new)?;
        tracing::info!(principal = %id, "registered account");

        Ok(Principal {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: new.created_at,
        })
    }

    /// Exchange email and password for an access token.
    ///
    /// Unknown email and wrong password fail identically.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let invalid = || VaultError::validation("Invalid login credentials");

        let principal = self
            .store
            .find_principal_by_email(email.trim())?
            .filter(|p| self.credentials.verify(password, &p.password_hash))
            .ok_or_else(|| {
                tracing::warn!("login failed");
                invalid()
            })?;

        let access = self.tokens.issue(&principal.id)?;
        tracing::info!(principal = %principal.id, "issued access token");

        Ok(LoginResponse {
            access,
            user: LoginUser {
                name: title_case(&principal.username),
                email: principal.email,
            },
        })
    }

    /// Resolve a bearer token to its principal.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidToken` if the token does not validate or
    /// its principal no longer exists.
    pub fn authenticate(&self, token: &str) -> Result<Principal> {
        let id = self.tokens.validate(token)?;
        self.store
            .get_principal(&id)?
            .ok_or(VaultError::InvalidToken)
    }

    /// Mail a password reset link to the account holder.
    pub fn request_password_reset(&self, email: &str) -> Result<()> {
        let principal = self
            .store
            .find_principal_by_email(email.trim())?
            .ok_or_else(|| VaultError::validation("User with this email does not exist."))?;

        let uid = encode_uid(&principal.id);
        let token = self.tokens.issue(&principal.id)?;
        let link = format!(
            "{}/{}/{}",
            self.reset_base_url.trim_end_matches('/'),
            uid,
            token
        );

        let message = MailMessage {
            to: principal.email.clone(),
            subject: RESET_MAIL_SUBJECT.to_string(),
            body: format!(
                "Hello {},\n\nUse the link below to reset your password:\n\n{}\n\n\
                 If you did not request a reset you can ignore this message.\n",
                principal.username, link
            ),
        };

        self.mailer.send(&message).map_err(|e| match e {
            VaultError::Delivery(_) => e,
            other => VaultError::Delivery(other.to_string()),
        })?;

        tracing::info!(principal = %principal.id, "sent password reset mail");
        Ok(())
    }

    /// Set a new password using the `uid` and `token` from a reset link.
    ///
    /// # Errors
    ///
    /// - `"Invalid token or user ID"` if `uid` does not name a principal
    /// - `"Invalid token"` if the token does not validate or was issued for
    ///   another principal
    /// - password validation errors as for [`AccountService::register`]
    pub fn confirm_password_reset(&self, uid: &str, token: &str, new_password: &str) -> Result<()> {
        let principal = decode_uid(uid)
            .map(|id| self.store.get_principal(&id))
            .transpose()?
            .flatten()
            .ok_or_else(|| VaultError::validation("Invalid token or user ID"))?;

        match self.tokens.validate(token) {
            Ok(subject) if subject == principal.id => {}
            _ => {
                tracing::warn!(principal = %principal.id, "password reset rejected");
                return Err(VaultError::validation("Invalid token"));
            }
        }

        validate_password(new_password)?;
        let password_hash = self.credentials.hash(new_password)?;
        self.store.set_password_hash(&principal.id, &password_hash)?;

        tracing::info!(principal = %principal.id, "password reset");
        Ok(())
    }
}

impl<S> std::fmt::Debug for AccountService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("tokens", &self.tokens)
            .field("reset_base_url", &self.reset_base_url)
            .finish_non_exhaustive()
    }
}

/// Opaque user identifier carried in reset links.
pub fn encode_uid(id: &Uuid) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

/// Inverse of [`encode_uid`]; `None` for anything it did not produce.
pub fn decode_uid(uid: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(uid.trim()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Uuid::parse_str(&text).ok()
}

/// Upper-case the first letter of every word, lower-case the rest.
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
