use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::actions::MutationFailed;
use crate::ui;

/// Failure talking to the relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("statement rejected: {0}")]
    Rejected(String),
}

/// Errors that reach the HTTP boundary and become an error page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mutation(#[from] MutationFailed),

    #[error("not found")]
    NotFound,

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, Html(ui::not_found_page())).into_response(),
            AppError::Mutation(failure) => {
                let message = format!("Failed to {} invoice.", failure.action);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(ui::error_page(&message)),
                )
                    .into_response()
            }
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(ui::error_page("Something went wrong!")),
                )
                    .into_response()
            }
        }
    }
}
