// HTTP API Error Types
use std::fmt::Display;

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::api::dto::ErrorBody;
use crate::auth::AuthError;

/// HTTP API error. Every failing request ends in exactly one of these, which
/// renders as `{"error": <message>, "code": <code>}`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 500 Internal Server Error
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::InternalError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::InternalError(_) => "internal_error",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.message().to_string(),
            code: self.error_code().to_string(),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    /// Internal failure with a client-facing `message`. The underlying cause
    /// is logged, never sent to the client.
    pub fn internal(message: impl Into<String>, cause: impl Display) -> Self {
        let message = message.into();
        tracing::error!("{}: {}", message, cause);
        ApiError::InternalError(message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::unauthorized("please provide a token"),
            other => {
                tracing::warn!("Rejected bearer token: {}", other);
                ApiError::unauthorized("unauthorized")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}
