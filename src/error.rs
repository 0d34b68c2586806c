use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message shown when a seat was taken between selection and checkout.
pub const SEAT_TAKEN_MESSAGE: &str = "seat no longer available, please reselect";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("authentication required")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session store error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn seat_taken() -> Self {
        AppError::Conflict(SEAT_TAKEN_MESSAGE.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// A conflicting booking can succeed on a fresh selection. A duplicate
    /// record never will.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Conflict(_) | AppError::AlreadyExists(_) => "CONFLICT",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("request failed: {}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            code: self.code(),
            message,
            retryable: self.is_retryable(),
        };

        (status, Json(body)).into_response()
    }
}
