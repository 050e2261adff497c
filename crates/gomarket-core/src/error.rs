//! # Error Types
//!
//! Domain-specific error types for gomarket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gomarket-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Persisted / incoming data failing the rules    │
//! │                                                                         │
//! │  gomarket-db errors (separate crate)                                   │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  gomarket-cart errors                                                  │
//! │  └── CartError        - What the UI layer sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → UI                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note that cart no-ops (adding a product twice, incrementing an unknown id)
//! are NOT errors. They are reported through [`crate::cart::CartChange`].

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A monetary amount could not be represented.
    ///
    /// ## When This Occurs
    /// - Persisted price is NaN or infinite
    /// - Persisted price overflows `i64` cents
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Data validation errors.
///
/// Raised when a cart restored from storage breaks an invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be at least one.
    #[error("{field} must be at least 1 (item {id})")]
    MustBePositive { field: String, id: String },

    /// Value must not be negative.
    #[error("{field} must not be negative (item {id})")]
    MustNotBeNegative { field: String, id: String },

    /// Duplicate value (e.g., two line items sharing one id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Duplicate {
            field: "id".to_string(),
            value: "p-1".to_string(),
        };
        assert_eq!(err.to_string(), "id 'p-1' already exists");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
            id: "p-1".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be at least 1 (item p-1)");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
