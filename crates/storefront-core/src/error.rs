//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core (this file)                                           │
//! │  └── ValidationError  - required field omitted / out of range          │
//! │                                                                         │
//! │  storefront-client                                                     │
//! │  ├── AuthError        - login, register, bootstrap                     │
//! │  ├── FetchError       - data reads                                     │
//! │  ├── OrderError       - checkout submission                            │
//! │  └── AdminError       - admin product management                       │
//! │                                                                         │
//! │  Flow: ValidationError ──► wrapped by the client error of the          │
//! │        operation that rejected the form, before any request is sent    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart operations are total and have no error type.

use thiserror::Error;

/// Client-side form validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Invalid format (e.g. an email without `@`).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
}

impl ValidationError {
    /// Name of the offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required { field: "address" };
        assert_eq!(err.to_string(), "address is required");

        let err = ValidationError::OutOfRange {
            field: "discount",
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "discount must be between 0 and 100");
        assert_eq!(err.field(), "discount");
    }
}
