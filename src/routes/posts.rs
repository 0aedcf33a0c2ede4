use askama::Template;
use axum::extract::{Path, State};
use axum::middleware;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::validation;
use crate::auth::{require_auth, Identity};
use crate::db::models::Post;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/create_post.html")]
pub struct CreatePostTemplate {
    pub username: Option<String>,
    pub title: String,
    pub body: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "pages/single_post.html")]
pub struct SinglePostTemplate {
    pub username: Option<String>,
    pub post: Post,
    pub author: Option<String>,
}

#[derive(Deserialize)]
pub struct NewPostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

pub fn router() -> Router<AppState> {
    let protected = Router::new()
        .route("/create-post", get(create_post_page).post(create_post))
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        .route("/post/{id}", get(show_post))
        .merge(protected)
}

async fn create_post_page(CurrentUser(claims): CurrentUser) -> Response {
    Html(CreatePostTemplate {
        username: Some(claims.username),
        title: String::new(),
        body: String::new(),
        errors: Vec::new(),
    })
    .into_response()
}

async fn create_post(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Form(form): Form<NewPostForm>,
) -> AppResult<Response> {
    let title = form.title.trim().to_string();

    let errors = validation::post_errors(&title, &form.body);
    if !errors.is_empty() {
        return Ok(Html(CreatePostTemplate {
            username: Some(claims.username),
            title,
            body: form.body,
            errors,
        })
        .into_response());
    }

    let created_date = chrono::Local::now().format("%d/%m/%Y").to_string();
    let post = state
        .posts
        .create(&title, &form.body, claims.user_id, &created_date)?;

    tracing::info!(post_id = post.id, author_id = claims.user_id, "Post created");
    Ok(Redirect::to(&format!("/post/{}", post.id)).into_response())
}

async fn show_post(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id: i64 = id.parse().map_err(|_| AppError::NotFound)?;
    let (post, author) = state
        .posts
        .find_with_author(id)?
        .ok_or(AppError::NotFound)?;

    Ok(Html(SinglePostTemplate {
        username: identity.username(),
        post,
        author: author.map(|u| u.username),
    })
    .into_response())
}
