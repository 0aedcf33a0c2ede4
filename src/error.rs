use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::db::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            // Missing posts and anonymous visitors both land on the home page.
            AppError::NotFound | AppError::Unauthorized => {
                return Redirect::to("/").into_response();
            }
            AppError::Repository(e) => tracing::error!("Repository error: {}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
