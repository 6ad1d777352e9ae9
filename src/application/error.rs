use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::application::repos::RepoError;
use crate::domain::moderation::TransitionError;
use crate::infra::error::InfraError;

/// Application-level failure, mapped onto transport status codes at the
/// HTTP boundary. Cache failures never appear here; they are logged and
/// absorbed inside the cache layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("a review for this product by this user already exists")]
    DuplicateReview,
    #[error("actor is not permitted to perform this operation")]
    Unauthorized,
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("store operation failed: {0}")]
    Store(RepoError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::DuplicateReview => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Infra(InfraError::Database { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Infra(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to API callers without leaking internals.
    fn public_message(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "resource not found",
            AppError::DuplicateReview => "a review for this product already exists",
            AppError::Unauthorized => "operation not permitted",
            AppError::InvalidTransition(_) => "review cannot be moderated from its current status",
            AppError::Validation(_) => "request could not be processed",
            AppError::Store(_) | AppError::Infra(InfraError::Database { .. }) => {
                "service temporarily unavailable"
            }
            AppError::Infra(_) | AppError::Unexpected(_) => "unexpected error occurred",
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { .. } => AppError::DuplicateReview,
            RepoError::NotFound => AppError::NotFound { entity: "resource" },
            RepoError::Pagination(err) => AppError::Validation(err.to_string()),
            RepoError::InvalidInput { message } => AppError::Validation(message),
            other => AppError::Store(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(ErrorBody { error: self.public_message() })).into_response()
    }
}
