use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

// every failure a callable endpoint reports; messages are safe to show users
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    ResourceExhausted(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    DeadlineExceeded(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        ApiError::Unauthenticated("User must be authenticated to use this feature".to_string())
    }

    pub fn rate_limited() -> Self {
        ApiError::ResourceExhausted("Rate limit exceeded. Please try again later.".to_string())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument(message.into())
    }

    pub fn deadline_exceeded() -> Self {
        ApiError::DeadlineExceeded("The request took too long to complete. Please try again.".to_string())
    }

    // generic error that leaks nothing about the cause
    pub fn internal() -> Self {
        ApiError::Internal("An internal error occurred. Please try again.".to_string())
    }

    // stable code clients branch on
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::ResourceExhausted(_) => "resource-exhausted",
            ApiError::InvalidArgument(_) => "invalid-argument",
            ApiError::DeadlineExceeded(_) => "deadline-exceeded",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status_name(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::ResourceExhausted(_) => "RESOURCE_EXHAUSTED",
            ApiError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ApiError::DeadlineExceeded(_) => "DEADLINE_EXCEEDED",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::ResourceExhausted(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "status": self.status_name(),
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (self.http_status(), Json(body)).into_response()
    }
}
