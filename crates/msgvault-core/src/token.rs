//! Bearer access tokens.
//!
//! Tokens are compact HS256 JWTs (`header.claims.signature`, base64url without
//! padding) so any JWT tooling can inspect them. The same tokens authenticate
//! API sessions and password-reset links.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Result, VaultError};

type HmacSha256 = Hmac<Sha256>;

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

const TOKEN_TYPE_ACCESS: &str = "access";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: String,
    /// Principal ID
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Unique token ID
    pub jti: String,
}

/// Issues and validates access tokens.
pub struct TokenIssuer {
    secret: SecretString,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create an issuer.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Config` if the secret is shorter than 32 bytes or
    /// the lifetime is not positive.
    pub fn new(secret: SecretString, ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        if secret.expose_secret().len() < MIN_SECRET_LENGTH {
            return Err(VaultError::Config(format!(
                "Token secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }
        if ttl <= Duration::zero() {
            return Err(VaultError::Config(
                "Token lifetime must be positive".to_string(),
            ));
        }

        Ok(Self { secret, ttl, clock })
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| VaultError::Crypto(format!("Invalid HMAC key: {}", e)))
    }

    /// Issue a token for a principal.
    pub fn issue(&self, principal_id: &Uuid) -> Result<String> {
        let now = self.clock.now();
        let header = Header {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let claims = Claims {
            token_type: TOKEN_TYPE_ACCESS.to_string(),
            sub: principal_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().simple().to_string(),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidToken` for any malformed, forged, foreign
    /// or expired token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut parts = token.trim().split('.');
        let (header_b64, claims_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(c), Some(s), None) => (h, c, s),
                _ => return Err(VaultError::InvalidToken),
            };

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| VaultError::InvalidToken)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| VaultError::InvalidToken)?;

        let header: Header = decode_segment(header_b64)?;
        if header.alg != "HS256" {
            return Err(VaultError::InvalidToken);
        }

        let claims: Claims = decode_segment(claims_b64)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(VaultError::InvalidToken);
        }

        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(VaultError::InvalidToken)?;
        if self.clock.now() >= expires_at {
            tracing::debug!(jti = %claims.jti, "rejected expired token");
            return Err(VaultError::InvalidToken);
        }

        Ok(claims)
    }

    /// Validate a token and return the principal it was issued for.
    pub fn validate(&self, token: &str) -> Result<Uuid> {
        let claims = self.decode(token)?;
        Uuid::parse_str(&claims.sub).map_err(|_| VaultError::InvalidToken)
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| VaultError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| VaultError::InvalidToken)
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
