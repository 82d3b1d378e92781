//! Favorites list routes. All of them require a signed-in user.

use super::body::FormOrJson;
use super::redirect_to_login;
use super::shared_types::ApiResponse;
use super::views;
use crate::app_state::AppState;
use crate::domain::ServiceError;
use crate::services::Identity;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AddFavoriteForm {
    joke: Option<String>,
}

/// Handler for appending a joke to the caller's favorites (POST /addToFavorites).
///
/// - `201 Created` with the updated list as JSON on success.
/// - `400 Bad Request` if `joke` is missing.
/// - `401 Unauthorized` with `Location: /login` when not signed in.
#[tracing::instrument(skip_all)]
pub async fn add_to_favorites(
    State(state): State<AppState>,
    identity: Identity,
    form: Result<FormOrJson<AddFavoriteForm>, Response>,
) -> Result<Response, ServiceError> {
    // ---
    let Identity::Authenticated(user) = identity else {
        return Ok(redirect_to_login());
    };

    let joke = match form {
        Ok(FormOrJson(AddFavoriteForm { joke: Some(joke) })) => joke,
        Ok(_) => return Ok((StatusCode::BAD_REQUEST, "joke is undefined").into_response()),
        Err(rejection) => return Ok(rejection),
    };

    let favorites = state.favorites().add(&user, &joke).await?;
    state.metrics().record_favorite_added();

    Ok((StatusCode::CREATED, ApiResponse { data: favorites }).into_response())
}

/// Handler for removing one favorite by position (POST /removeFromFavorites/{id}).
///
/// `id` is the 0-based position in the list as last rendered. Positions shift
/// after every removal, so an index is only good once.
///
/// - `202 Accepted` with the updated list as JSON on success.
/// - `400 Bad Request` if `id` is not an integer or is out of range.
/// - `401 Unauthorized` with `Location: /login` when not signed in.
#[tracing::instrument(skip_all, fields(index = %id))]
pub async fn remove_from_favorites(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    // ---
    let Identity::Authenticated(user) = identity else {
        return Ok(redirect_to_login());
    };

    let Ok(index) = id.parse::<i64>() else {
        return Ok((StatusCode::BAD_REQUEST, "favorite index must be an integer").into_response());
    };

    let favorites = state.favorites().remove(&user, index).await?;
    state.metrics().record_favorite_removed();

    Ok((StatusCode::ACCEPTED, ApiResponse { data: favorites }).into_response())
}

/// Handler rendering the caller's favorites (GET /favoritos).
pub async fn list_favorites(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Response, ServiceError> {
    // ---
    let Identity::Authenticated(user) = identity else {
        return Ok(redirect_to_login());
    };

    let favorites = state.favorites().list(&user).await?;

    Ok(views::favorites_page(&user, &favorites).into_response())
}
