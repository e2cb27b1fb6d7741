//! HTTP error mapping for journal routes.

use crate::identity::login_url;
use crate::render;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use learning_log_core::{AccountError, JournalError, RepoError};
use log::error;
use thiserror::Error;

/// Failures a handler can resolve to.
#[derive(Debug, Error)]
pub enum WebError {
    /// Gated route without a valid session.
    #[error("authentication required for {next}")]
    AuthenticationRequired { next: String },

    /// Record absent or not owned by the caller.
    #[error("not found")]
    NotFound,

    /// Store or state failure. Details are logged, never rendered.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WebError {
    /// - AuthenticationRequired: 303 See Other to the login page
    /// - NotFound: 404 Not Found
    /// - Internal: 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired { .. } => StatusCode::SEE_OTHER,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JournalError> for WebError {
    fn from(value: JournalError) -> Self {
        match value {
            JournalError::NotFound => Self::NotFound,
            JournalError::Repo(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<RepoError> for WebError {
    fn from(value: RepoError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<AccountError> for WebError {
    fn from(value: AccountError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthenticationRequired { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, Html(render::not_found())).into_response(),
            Self::Internal(message) => {
                error!("event=http_error module=web status=error error={message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(render::server_error()),
                )
                    .into_response()
            }
        }
    }
}
