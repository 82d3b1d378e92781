// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod auth;
mod body;
mod cookies;
mod error;
mod favorites;
mod health;
mod identity;
mod metrics;
mod root;
mod shared_types;
mod views;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

// Core handlers
pub use health::health_check;
pub use metrics::{metrics_handler, track_requests};
pub use root::root_handler;

// Account and session handlers
pub use auth::{login, login_form, logout, register, register_form, remove_account};

// Favorites handlers
pub use favorites::{add_to_favorites, list_favorites, remove_from_favorites};

pub use cookies::SESSION_COOKIE;

/// `302 Found` to `location`.
pub(crate) fn found(location: &'static str) -> Response {
    // ---
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Answer for protected routes hit without a valid session: `401` pointing at `/login`.
pub(crate) fn redirect_to_login() -> Response {
    // ---
    (StatusCode::UNAUTHORIZED, [(header::LOCATION, "/login")]).into_response()
}
