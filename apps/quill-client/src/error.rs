//! # App Error Type
//!
//! Unified error type for session and state-container operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Quill Invoicing                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  State container operation                                       │  │
//! │  │  Result<T, AppError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Local validation? ─── ValidationError ───────────┐             │  │
//! │  │         │                                          │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Backend call? ─── HttpError::Status("...") ───► AppError ──────►│  │
//! │  │         │                                          ▲             │  │
//! │  │         ▼                                          │             │  │
//! │  │  Context missing? ─── CoreError::NoClientSelected ─┘             │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  container.error() == Some("name is required")                         │
//! │  err.code == ErrorCode::BackendError                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Messages
//! `message` is what the containers store in their error field, so backend
//! messages pass through untouched. Transport details are logged, not shown.

use serde::Serialize;

use quill_core::{CoreError, ValidationError};
use quill_http::HttpError;

/// Error returned from session and container operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "BACKEND_ERROR",
///   "message": "client has invoices"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404, or absent from the loaded list)
    NotFound,

    /// Input rejected locally or by the backend's 400/422
    ValidationError,

    /// Any other non-2xx backend response
    BackendError,

    /// The backend could not be reached
    NetworkError,

    /// A client-scoped operation ran with no client selected
    NoClientSelected,

    /// Unexpected response shape or local failure
    Internal,
}

impl AppError {
    /// Creates a new app error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: i64) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }

    /// The message to record in a container, or `fallback` when this error
    /// carries none.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.message.trim().is_empty() {
            fallback
        } else {
            &self.message
        }
    }
}

/// Result type for app operations.
pub type AppResult<T> = Result<T, AppError>;

/// Converts backend call errors to app errors.
impl From<HttpError> for AppError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, message } => {
                let code = match status {
                    404 => ErrorCode::NotFound,
                    400 | 422 => ErrorCode::ValidationError,
                    _ => ErrorCode::BackendError,
                };
                AppError::new(code, message)
            }
            HttpError::Transport(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Backend unreachable: {}", e);
                AppError::new(ErrorCode::NetworkError, "Could not reach the invoicing server")
            }
            HttpError::InvalidId { entity, id } => {
                AppError::validation(format!("Invalid {} id: {}", entity, id))
            }
            err @ (HttpError::Decode { .. } | HttpError::MissingBody { .. }) => {
                tracing::error!("{}", err);
                AppError::internal("Unexpected response from the invoicing server")
            }
        }
    }
}

/// Converts core errors to app errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidId { .. } => AppError::validation(err.to_string()),
            CoreError::NoClientSelected => {
                AppError::new(ErrorCode::NoClientSelected, err.to_string())
            }
            CoreError::NoDraft => AppError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Converts validation errors to app errors. The message is the bare
/// field error, e.g. `name is required`.
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
