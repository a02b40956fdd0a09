//! # Error Types
//!
//! Domain-specific error types for subtrack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  subtrack-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  subtrack-store errors (separate crate)                                │
//! │  └── StoreError       - Local database failures                        │
//! │                                                                         │
//! │  subtrack-sync errors (separate crate)                                 │
//! │  └── SyncError        - Remote/replay failures (rarely surfaced:       │
//! │                         transport failures degrade, never throw)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError/SyncError → caller     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, kind, id)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record kind string from storage didn't match a known kind.
    ///
    /// ## When This Occurs
    /// - A hand-edited or future-version cache row
    /// - A queue entry written by a newer release
    #[error("Unknown record kind: {0}")]
    UnknownRecordKind(String),

    /// A subscription id collides within a user's set.
    #[error("Duplicate subscription id: {0}")]
    DuplicateSubscriptionId(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before anything is persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
    fn test_error_messages() {
        let err = CoreError::UnknownRecordKind("receipts".to_string());
        assert_eq!(err.to_string(), "Unknown record kind: receipts");

        let err = ValidationError::MustNotBeNegative {
            field: "income".to_string(),
        };
        assert_eq!(err.to_string(), "income must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
