//! Error types for rollcall-api and their JSON responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rollcall_core::DuplicateField;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for rollcall-api handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors a handler can return.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    /// Error from the registration service
    #[error(transparent)]
    Core(#[from] rollcall_core::Error),

    /// Request body could not be decoded
    #[error("{0}")]
    BadRequest(String),

    /// No route matched
    #[error("Route not found")]
    NotFound,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Body of every failed response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Set on 409 responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
    /// Colliding field on 409 responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<DuplicateField>,
}

impl ErrorBody {
    fn message(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            duplicate: None,
            field: None,
        }
    }
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(rollcall_core::Error::Validation { .. }) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Core(rollcall_core::Error::Duplicate { .. }) => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        use rollcall_core::Error;

        match self {
            ApiError::Core(Error::Validation { message, .. }) => ErrorBody::message(message),
            ApiError::Core(Error::Duplicate { field }) => ErrorBody {
                duplicate: Some(true),
                field: Some(*field),
                ..ErrorBody::message(field.message())
            },
            ApiError::Core(Error::Backend { message, .. }) => ErrorBody::message(message),
            ApiError::Core(other) => ErrorBody::message(other.to_string()),
            ApiError::BadRequest(message) => ErrorBody::message(message),
            ApiError::NotFound => ErrorBody::message("Route not found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
