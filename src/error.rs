use crate::engine::EngineError;
use crate::server::rate_limit::RateLimitError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stable error codes surfaced to clients.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    RateLimitExceeded,
    RemoteApiError,
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::RemoteApiError => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body: `{ error, message, timestamp }`.
#[derive(Serialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: ErrorCode,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// An error ready to leave the process. The message is already safe to show.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

const REMOTE_PUBLIC_MESSAGE: &str =
    "The tutoring service is temporarily unavailable. Please try again later.";
const INTERNAL_PUBLIC_MESSAGE: &str = "An unexpected error occurred.";

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationError,
            message: message.into(),
        }
    }

    /// In production the detail is replaced by a generic message.
    pub fn internal(detail: impl Into<String>, production: bool) -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: if production {
                INTERNAL_PUBLIC_MESSAGE.to_string()
            } else {
                detail.into()
            },
        }
    }

    pub fn from_engine(err: EngineError, production: bool) -> Self {
        match err {
            EngineError::Validation(e) => Self::validation(e.to_string()),
            remote @ (EngineError::Remote(_) | EngineError::AllPersonasFailed { .. }) => Self {
                code: ErrorCode::RemoteApiError,
                message: if production {
                    REMOTE_PUBLIC_MESSAGE.to_string()
                } else {
                    remote.to_string()
                },
            },
        }
    }
}

impl From<RateLimitError> for ApiError {
    fn from(err: RateLimitError) -> Self {
        Self {
            code: ErrorCode::RateLimitExceeded,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code,
            message: self.message,
            timestamp: Utc::now(),
        };
        (self.code.status(), Json(body)).into_response()
    }
}
