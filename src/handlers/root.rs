use super::views;
use crate::services::Identity;
use axum::response::IntoResponse;

/// Home page: greets the signed-in user or points at login and registration.
pub async fn root_handler(identity: Identity) -> impl IntoResponse {
    views::home_page(identity.user())
}
