//! Request identity extractor.

use super::cookies::SESSION_COOKIE;
use crate::app_state::AppState;
use crate::domain::ServiceError;
use crate::services::Identity;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

/// Resolves the `jwt` cookie through the request authenticator.
///
/// Declaring `identity: Identity` on a handler resolves the caller exactly once
/// per request. Bad tokens come back as `Identity::Anonymous`; only a store
/// failure rejects the request.
impl FromRequestParts<AppState> for Identity {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string());

        state.authenticator().resolve(token.as_deref()).await
    }
}
