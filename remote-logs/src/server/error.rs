//! HTTP error types for the log server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::response::with_api_headers;
use crate::Error;

/// Request failure, carrying the wire code and HTTP status it maps to.
///
/// Error responses have the format:
/// ```json
/// { "success": false, "error": "...", "code": "..." }
/// ```
/// Messages are fixed strings; internal error detail never reaches the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// The endpoint was called with a method other than POST.
    MethodNotAllowed,
    /// The body is not valid JSON.
    InvalidJson,
    /// The body is JSON but a field has an unusable shape.
    InvalidField(&'static str),
    /// No `secret_key` was supplied.
    MissingSecretKey,
    /// `secret_key` did not authenticate the caller.
    InvalidSecretKey,
    /// The log store could not be reached.
    DbConnection,
    /// The log store was reachable but the query failed.
    DbQuery,
    /// Anything else.
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    code: &'static str,
}

impl ApiError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiError::InvalidJson | ApiError::InvalidField(_) => "INVALID_JSON",
            ApiError::MissingSecretKey => "MISSING_SECRET_KEY",
            ApiError::InvalidSecretKey => "INVALID_SECRET_KEY",
            ApiError::DbConnection => "DB_CONNECTION_ERROR",
            ApiError::DbQuery => "DB_QUERY_ERROR",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }

    /// Human-readable message returned to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed => "Method not allowed. Only POST requests are accepted.",
            ApiError::InvalidJson => "Invalid JSON format",
            ApiError::InvalidField(msg) => *msg,
            ApiError::MissingSecretKey => "Secret key is required",
            ApiError::InvalidSecretKey => "Invalid secret key",
            ApiError::DbConnection => "Database connection failed",
            ApiError::DbQuery => "Database query failed",
            ApiError::Internal => "Internal server error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidJson | ApiError::InvalidField(_) | ApiError::MissingSecretKey => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidSecretKey => StatusCode::UNAUTHORIZED,
            ApiError::DbConnection | ApiError::DbQuery | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns true for failures caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.message(),
            code: self.code(),
        };
        with_api_headers(self.status(), &body)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Connection(_) => ApiError::DbConnection,
            Error::Query(_) => ApiError::DbQuery,
            Error::InvalidInput(_) | Error::Internal(_) => ApiError::Internal,
        }
    }
}
