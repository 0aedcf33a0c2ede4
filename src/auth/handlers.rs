use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::cookie::{clear_session_cookie, session_cookie};
use crate::auth::session::SESSION_TTL_SECS;
use crate::auth::validation::{self, LOGIN_FAILED, USERNAME_TAKEN};
use crate::auth::{password, Identity};
use crate::db::RepositoryError;
use crate::error::AppResult;
use crate::routes::home::Html;
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub struct SignupTemplate {
    pub username: Option<String>,
    pub form_username: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub username: Option<String>,
    pub form_username: String,
    pub errors: Vec<String>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// -- Helpers --

fn signup_form(form_username: String, errors: Vec<String>) -> Response {
    Html(SignupTemplate {
        username: None,
        form_username,
        errors,
    })
    .into_response()
}

fn login_form(form_username: String, errors: Vec<String>) -> Response {
    Html(LoginTemplate {
        username: None,
        form_username,
        errors,
    })
    .into_response()
}

/// Issue a fresh session cookie and send the browser home.
fn signed_in(state: &AppState, user_id: i64, username: &str) -> Response {
    let token = state.sessions.issue(user_id, username);
    let cookie = session_cookie(&state.config.auth.cookie_name, &token, SESSION_TTL_SECS);

    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}

// -- Handlers --

/// GET /signup
pub async fn signup_page(identity: Identity) -> Response {
    Html(SignupTemplate {
        username: identity.username(),
        form_username: String::new(),
        errors: Vec::new(),
    })
    .into_response()
}

/// GET /login
pub async fn login_page(identity: Identity) -> Response {
    Html(LoginTemplate {
        username: identity.username(),
        form_username: String::new(),
        errors: Vec::new(),
    })
    .into_response()
}

/// POST /register — create the account and sign it in
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    let username = form.username.trim().to_string();

    let errors = validation::registration_errors(&username, &form.password);
    if !errors.is_empty() {
        return Ok(signup_form(username, errors));
    }

    // Fast path only; the UNIQUE constraint below is what actually decides.
    if state.users.find_by_username(&username)?.is_some() {
        return Ok(signup_form(username, vec![USERNAME_TAKEN.to_string()]));
    }

    let password_hash =
        password::hash_blocking_pool(form.password, state.config.auth.bcrypt_cost).await?;

    let user = match state.users.create(&username, &password_hash) {
        Ok(user) => user,
        Err(RepositoryError::DuplicateUsername) => {
            return Ok(signup_form(username, vec![USERNAME_TAKEN.to_string()]));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok(signed_in(&state, user.id, &user.username))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    let username = form.username.trim().to_string();
    let failed = |username: String| login_form(username, vec![LOGIN_FAILED.to_string()]);

    if username.is_empty() || form.password.is_empty() {
        return Ok(failed(username));
    }

    let Some(user) = state.users.find_by_username(&username)? else {
        password::verify_blocking_pool(form.password, state.decoy_hash.to_string()).await;
        tracing::debug!("Login rejected: unknown user");
        return Ok(failed(username));
    };

    if !password::verify_blocking_pool(form.password, user.password_hash.clone()).await {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Ok(failed(username));
    }

    tracing::info!(user_id = user.id, "User logged in");
    Ok(signed_in(&state, user.id, &user.username))
}

/// GET /logout — clear the cookie and redirect. The token itself stays valid
/// until it expires.
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (
                header::SET_COOKIE,
                clear_session_cookie(&state.config.auth.cookie_name),
            ),
        ],
    )
        .into_response()
}
