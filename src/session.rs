//! Stateless session tokens.
//!
//! Tokens are HS256-signed JWTs asserting `iss` (this service) and `sub` (the
//! user name), with `iat`/`exp` bounding the validity window. Nothing is kept
//! server-side, so a token stays valid until it expires or the signing secret
//! is rotated; there is no revocation.

use crate::config::SessionConfig;
use crate::domain::ServiceError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

// ---

/// Issuer claim identifying tokens minted by this service.
pub const TOKEN_ISSUER: &str = "pleading_face";

/// Claims carried by every session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    //
    iss: String,
    sub: String,
    iat: i64,
    exp: i64,
}

// ---

/// Issues and verifies session tokens with a process-wide signing secret.
#[derive(Clone)]
pub struct TokenService {
    //
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl TokenService {
    // ---
    pub fn new(config: &SessionConfig) -> Self {
        //
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: chrono::Duration::seconds(config.ttl_secs()),
        }
    }

    /// Validity window of newly issued tokens.
    pub fn ttl(&self) -> chrono::Duration {
        //
        self.ttl
    }

    /// Issues a token for `username`, valid from now for the configured lifetime.
    pub fn issue(&self, username: &str) -> Result<String, ServiceError> {
        //
        self.issue_at(username, Utc::now())
    }

    /// Issues a token as if minted at `issued_at`.
    ///
    /// Fails with [`ServiceError::Internal`] if the expiry is not representable
    /// or signing fails.
    pub fn issue_at(&self, username: &str, issued_at: DateTime<Utc>) -> Result<String, ServiceError> {
        //
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ServiceError::Internal("session expiry out of range".to_string()))?;

        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: username.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            //
            tracing::error!("Failed to sign session token: {:?}", e);
            ServiceError::Internal("token signing failed".to_string())
        })
    }

    /// Verifies `token` and returns its subject unmodified.
    ///
    /// Every failure mode (malformed input, bad signature, wrong issuer,
    /// missing or empty subject, expiry) is reported as [`ServiceError::Invalid`].
    pub fn verify(&self, token: &str) -> Result<String, ServiceError> {
        //
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            //
            tracing::debug!("Session token rejected: {:?}", e.kind());
            ServiceError::Invalid
        })?;

        if data.claims.sub.is_empty() {
            return Err(ServiceError::Invalid);
        }

        Ok(data.claims.sub)
    }
}
