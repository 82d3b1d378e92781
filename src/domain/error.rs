use thiserror::Error;

/// Failure taxonomy shared by the credential, token and favorites services.
///
/// Token verification failures are deliberately collapsed into [`ServiceError::Invalid`]:
/// malformed input, bad signature, wrong issuer, missing subject and expiry are
/// indistinguishable to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    // ---
    #[error("user not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("a user with the same name already exists")]
    Conflict,

    #[error("favorite index {index} out of range for list of length {len}")]
    OutOfRange { index: i64, len: usize },

    #[error("store unavailable: {0}")]
    Transient(String),

    #[error("invalid session token")]
    Invalid,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    // ---
    /// Wraps a store-layer failure. The message is for logs only.
    pub fn transient(err: impl std::fmt::Display) -> Self {
        // ---
        ServiceError::Transient(err.to_string())
    }

    pub fn is_transient(&self) -> bool {
        // ---
        matches!(self, ServiceError::Transient(_))
    }
}
