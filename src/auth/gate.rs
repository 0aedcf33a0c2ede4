//! Per-request identity.
//!
//! [`auth_gate`] runs before routing and always leaves an [`Identity`] in the
//! request extensions. [`require_auth`] is layered onto protected routes and
//! sends anonymous visitors home before the handler runs.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::cookie::cookie_value;
use super::session::SessionClaims;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(SessionClaims),
    Anonymous,
}

impl Identity {
    pub fn claims(&self) -> Option<&SessionClaims> {
        match self {
            Identity::Authenticated(claims) => Some(claims),
            Identity::Anonymous => None,
        }
    }

    pub fn username(&self) -> Option<String> {
        self.claims().map(|c| c.username.clone())
    }
}

pub async fn auth_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let identity = cookie_value(req.headers(), &state.config.auth.cookie_name)
        .filter(|token| !token.is_empty())
        .and_then(|token| state.sessions.verify(token))
        .map_or(Identity::Anonymous, Identity::Authenticated);

    req.extensions_mut().insert(identity);
    next.run(req).await
}

pub async fn require_auth(req: Request, next: Next) -> Response {
    match req.extensions().get::<Identity>() {
        Some(Identity::Authenticated(_)) => next.run(req).await,
        _ => Redirect::to("/").into_response(),
    }
}
