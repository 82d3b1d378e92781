use crate::domain::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Maps service failures to status codes with a short plain-text message.
///
/// Routes whose status is fixed by the HTTP contract (login, registration)
/// match on the error themselves before falling back to this.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        // ---
        let status = match &self {
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized | ServiceError::Invalid => StatusCode::UNAUTHORIZED,
            ServiceError::Conflict => StatusCode::CONFLICT,
            ServiceError::OutOfRange { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Store and internal details stay in the logs.
        let message = match &self {
            ServiceError::Transient(_) => "Service temporarily unavailable, please retry".to_string(),
            ServiceError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, message).into_response()
    }
}
