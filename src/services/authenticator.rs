//! Resolves an inbound session cookie to an identity.

use super::credentials::CredentialStore;
use crate::domain::{ServiceError, User};
use crate::session::TokenService;
use std::sync::Arc;

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    // ---
    Anonymous,
    Authenticated(User),
}

impl Identity {
    // ---
    pub fn user(&self) -> Option<&User> {
        // ---
        match self {
            Identity::Authenticated(user) => Some(user),
            Identity::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        // ---
        self.user().is_some()
    }
}

/// Composes token verification with a user lookup.
#[derive(Clone)]
pub struct RequestAuthenticator {
    // ---
    tokens: Arc<TokenService>,
    credentials: CredentialStore,
}

impl RequestAuthenticator {
    // ---
    pub fn new(tokens: Arc<TokenService>, credentials: CredentialStore) -> Self {
        // ---
        Self {
            tokens,
            credentials,
        }
    }

    /// Resolves the session token carried by the request, if any.
    ///
    /// A missing, empty, forged or expired token, or one naming a user that no
    /// longer exists, resolves to [`Identity::Anonymous`]. Only store failures
    /// surface as errors.
    pub async fn resolve(&self, token: Option<&str>) -> Result<Identity, ServiceError> {
        // ---
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Identity::Anonymous);
        };

        let Ok(name) = self.tokens.verify(token) else {
            return Ok(Identity::Anonymous);
        };

        match self.credentials.find_by_name(&name).await {
            Ok(user) => Ok(Identity::Authenticated(user)),
            Err(ServiceError::NotFound) => {
                tracing::debug!("Session names a user that no longer exists: {}", name);
                Ok(Identity::Anonymous)
            }
            Err(err) => Err(err),
        }
    }
}
