//! # Error Types
//!
//! Domain-specific error types for quill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quill-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  quill-http errors (separate crate)                                    │
//! │  └── HttpError        - Transport / backend failures                   │
//! │                                                                         │
//! │  quill-client errors (in app)                                          │
//! │  └── AppError         - What the UI sees (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → UI error state         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The totals engine itself never fails: bad numbers are coerced to zero so a
//! half-typed draft still renders. Errors only come from validation and from
//! operations that need context (a selected client, a loaded draft).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An entity id is not a positive integer.
    ///
    /// ## When This Occurs
    /// - Deleting or patching a client with id `0` or a negative id
    /// - Any product call with a malformed product id
    #[error("Invalid {entity} id: {id}")]
    InvalidId { entity: String, id: i64 },

    /// A client-scoped operation was attempted with no client selected.
    #[error("No client selected")]
    NoClientSelected,

    /// A draft operation was attempted before any draft was loaded.
    #[error("No invoice draft loaded")]
    NoDraft,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidId error for the given entity kind.
    pub fn invalid_id(entity: impl Into<String>, id: i64) -> Self {
        CoreError::InvalidId {
            entity: entity.into(),
            id,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These mirror the backend's field errors so obviously bad input is caught
/// before a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. multi-line name, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Field is present but not allowed in this combination.
    #[error("{field} {reason}")]
    NotAllowed { field: String, reason: String },

    /// A PATCH carried no fields at all.
    #[error("no fields to update")]
    EmptyPatch,
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn not_allowed(field: &str, reason: &str) -> Self {
        ValidationError::NotAllowed {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_message() {
        let err = CoreError::invalid_id("client", -3);
        assert_eq!(err.to_string(), "Invalid client id: -3");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("name");
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        };
        assert_eq!(err.to_string(), "name must be at least 2 characters");

        let err = ValidationError::not_allowed("hourlyRate", "not allowed for flat pricing");
        assert_eq!(err.to_string(), "hourlyRate not allowed for flat pricing");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptyPatch.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
