// ABOUTME: Unified error taxonomy for the registry gateway
// ABOUTME: Defines the eight error kinds used across repositories, services, and the HTTP edge

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The eight error kinds of the registry gateway's error handling design.
///
/// Each kind maps to exactly one HTTP status class; services translate
/// lower-level failures (repository errors, scanner process failures) into
/// one of these before they reach the HTTP edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input violates a data-model invariant.
    Validation,
    /// Entity absent.
    NotFound,
    /// Primary-key collision.
    AlreadyExists,
    /// Scope or visibility check failed.
    PermissionDenied,
    /// Missing or invalid credentials.
    Unauthenticated,
    /// Repository or search backend unreachable or returned an infrastructure error.
    BackendUnavailable,
    /// A scanner subprocess timed out or exited non-zero.
    ExternalProcessFailed,
    /// Anything else; always logged with context.
    Unexpected,
}

impl ErrorKind {
    /// The HTTP status class this error kind maps to.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthenticated => 401,
            Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::BackendUnavailable => 503,
            Self::ExternalProcessFailed => 502,
            Self::Unexpected => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::PermissionDenied => "permission_denied",
            Self::Unauthenticated => "unauthenticated",
            Self::BackendUnavailable => "backend_unavailable",
            Self::ExternalProcessFailed => "external_process_failed",
            Self::Unexpected => "unexpected",
        };
        f.write_str(s)
    }
}

/// Application error carrying a kind, a client-safe message, and optional detail.
#[derive(Debug, Clone, Error, Serialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, format!("{} not found", resource.into()))
    }

    #[must_use]
    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::AlreadyExists,
            format!("{} already exists", resource.into()),
        )
    }

    #[must_use]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    #[must_use]
    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BackendUnavailable, message)
    }

    #[must_use]
    pub fn external_process_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalProcessFailed, message)
    }

    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.kind.http_status()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Wire shape for `{error, message, detail?}` responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            error: error.kind,
            message: error.message.clone(),
            detail: error.detail.clone(),
        }
    }
}

#[cfg(feature = "http-response")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::Json;

        tracing::warn!(kind = %self.kind, message = %self.message, "request failed");
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse::from(&self);
        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation(format!("JSON error: {error}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::unexpected(format!("IO error: {error}"))
    }
}
