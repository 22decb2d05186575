//! # HTTP Error Types
//!
//! Error types for calls to the invoicing backend.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  reqwest::Error / non-2xx response / bad JSON                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HttpError (this module) ← Carries the backend's message when it has one│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in quill-client) ← {code, message} for the UI               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  State container records message in its error field                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Backend call errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request never produced a response.
    ///
    /// ## When This Occurs
    /// - Backend not running / connection refused
    /// - DNS failure
    /// - Connection dropped mid-body
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    ///
    /// `message` is already resolved: the backend's `error.message`, else
    /// the raw body, else `Response status: {status}`.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A success body did not match the expected shape.
    #[error("Unexpected response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A success response had no body where an entity was required.
    #[error("Empty response from {path}")]
    MissingBody { path: String },

    /// An id failed the positive-integer check; no request was sent.
    #[error("Invalid {entity} id: {id}")]
    InvalidId { entity: String, id: i64 },
}

impl HttpError {
    /// HTTP status of a backend rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 404 responses.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Convenience type alias for Results with HttpError.
pub type HttpResult<T> = Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_displays_backend_message() {
        let err = HttpError::Status {
            status: 409,
            message: "client has invoices".to_string(),
        };
        assert_eq!(err.to_string(), "client has invoices");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_invalid_id_message() {
        let err = HttpError::InvalidId {
            entity: "product".to_string(),
            id: 0,
        };
        assert_eq!(err.to_string(), "Invalid product id: 0");
        assert_eq!(err.status(), None);
    }
}
