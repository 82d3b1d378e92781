//! Login, registration, logout and account removal.

use super::body::FormOrJson;
use super::cookies::{removal_cookie, session_cookie};
use super::views;
use super::{found, redirect_to_login};
use crate::app_state::AppState;
use crate::domain::ServiceError;
use crate::services::Identity;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /login` and `POST /registrar`.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    //
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsForm {
    /// Both fields, or a 400 naming what is missing.
    fn from_body(FormOrJson(form): FormOrJson<Self>) -> Result<(String, String), Response> {
        //
        match (form.username, form.password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err((StatusCode::BAD_REQUEST, "username and password are required").into_response()),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

/// `GET /login` - login form, or back home if already signed in.
pub async fn login_form(identity: Identity) -> Response {
    //
    if identity.is_authenticated() {
        return found("/");
    }

    views::login_page().into_response()
}

/// `POST /login` - verifies credentials and sets the session cookie.
///
/// # Responses
/// - `302 Found` to `/` with a fresh `jwt` cookie on success
/// - `404 Not Found` if no user has that name
/// - `401 Unauthorized` if the password is wrong
/// - `400 Bad Request` if a field is missing or the body is malformed
///
/// An already signed-in caller is sent home before the body is looked at.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    identity: Identity,
    jar: CookieJar,
    form: Result<FormOrJson<CredentialsForm>, Response>,
) -> Result<Response, ServiceError> {
    //
    if identity.is_authenticated() {
        return Ok(found("/"));
    }

    let (username, password) = match form.and_then(CredentialsForm::from_body) {
        Ok(parts) => parts,
        Err(response) => return Ok(response),
    };

    let user = match state.credentials().login(&username, &password).await {
        Ok(user) => user,
        Err(ServiceError::NotFound) => {
            state.metrics().record_login(false);
            return Ok((StatusCode::NOT_FOUND, "User not found").into_response());
        }
        Err(ServiceError::Unauthorized) => {
            state.metrics().record_login(false);
            return Ok((StatusCode::UNAUTHORIZED, "Incorrect password").into_response());
        }
        Err(err) => return Err(err),
    };

    let token = state.tokens().issue(&user.name)?;

    state.metrics().record_login(true);
    tracing::info!("User '{}' logged in", user.name);

    let jar = jar.add(session_cookie(token, state.session()));
    Ok((jar, found("/")).into_response())
}

// ============================================================================
// Registration
// ============================================================================

/// `GET /registrar` - registration form, or back home if already signed in.
pub async fn register_form(identity: Identity) -> Response {
    //
    if identity.is_authenticated() {
        return found("/");
    }

    views::register_page().into_response()
}

/// `POST /registrar` - creates the account. Does not sign the user in.
///
/// # Responses
/// - `302 Found` to `/` on success
/// - `403 Forbidden` if the name is taken
/// - `400 Bad Request` if a field is missing or empty
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    identity: Identity,
    form: Result<FormOrJson<CredentialsForm>, Response>,
) -> Result<Response, ServiceError> {
    //
    if identity.is_authenticated() {
        return Ok(found("/"));
    }

    let (username, password) = match form.and_then(CredentialsForm::from_body) {
        Ok(parts) => parts,
        Err(response) => return Ok(response),
    };

    if username.is_empty() || password.is_empty() {
        return Ok(
            (StatusCode::BAD_REQUEST, "username and password must not be empty").into_response(),
        );
    }

    match state.credentials().register(&username, &password).await {
        Ok(_) => {
            state.metrics().record_registration();
            Ok(found("/"))
        }
        Err(ServiceError::Conflict) => Ok((
            StatusCode::FORBIDDEN,
            "User with same name already exists.",
        )
            .into_response()),
        Err(err) => Err(err),
    }
}

// ============================================================================
// Logout / account removal
// ============================================================================

/// `GET /logout` - clears the session cookie. Tokens stay valid until expiry;
/// there is no server-side session to end.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    //
    let jar = jar.remove(removal_cookie(state.session()));
    (jar, found("/login")).into_response()
}

/// `GET /removeAccount` - hard-deletes the signed-in user and clears the cookie.
#[tracing::instrument(skip_all)]
pub async fn remove_account(
    State(state): State<AppState>,
    identity: Identity,
    jar: CookieJar,
) -> Result<Response, ServiceError> {
    //
    let Identity::Authenticated(user) = identity else {
        return Ok(redirect_to_login());
    };

    state.credentials().delete_user(&user).await?;

    let jar = jar.remove(removal_cookie(state.session()));
    Ok((jar, found("/login")).into_response())
}
