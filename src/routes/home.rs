use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::auth::Identity;
use crate::db::models::Post;
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub username: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub username: Option<String>,
    pub display_name: String,
    pub posts: Vec<Post>,
}

#[derive(Template)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub username: Option<String>,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// GET / — dashboard for signed-in users, landing page otherwise
pub async fn index(State(state): State<AppState>, identity: Identity) -> AppResult<Response> {
    match identity {
        Identity::Authenticated(claims) => {
            let posts = state.posts.list_by_author(claims.user_id)?;
            Ok(Html(DashboardTemplate {
                username: Some(claims.username.clone()),
                display_name: claims.username,
                posts,
            })
            .into_response())
        }
        Identity::Anonymous => Ok(Html(HomeTemplate { username: None }).into_response()),
    }
}

pub async fn about(identity: Identity) -> Response {
    Html(AboutTemplate {
        username: identity.username(),
    })
    .into_response()
}
