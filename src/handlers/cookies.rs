//! The `jwt` session cookie.

use crate::config::SessionConfig;
use axum_extra::extract::cookie::{Cookie, SameSite};

pub const SESSION_COOKIE: &str = "jwt";

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String, session: &SessionConfig) -> Cookie<'static> {
    // ---
    Cookie::build((SESSION_COOKIE, token))
        .domain(session.domain.clone())
        .path("/")
        .secure(true)
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(session.ttl_secs()))
        .build()
}

/// Matches the scope of [`session_cookie`] so `CookieJar::remove` clears it.
pub fn removal_cookie(session: &SessionConfig) -> Cookie<'static> {
    // ---
    Cookie::build((SESSION_COOKIE, ""))
        .domain(session.domain.clone())
        .path("/")
        .build()
}
