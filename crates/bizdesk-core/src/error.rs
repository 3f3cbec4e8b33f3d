//! # Error Types
//!
//! Domain-specific error types for bizdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bizdesk-core errors (this file)                                       │
//! │  ├── CoreError        - Cart/draft rule violations                     │
//! │  └── ValidationError  - Form field parsing failures                    │
//! │                                                                         │
//! │  cli errors (apps/cli)                                                 │
//! │  └── AppError         - I/O, config, and document failures             │
//! │                                                                         │
//! │  NOT AN ERROR: totals anomalies. The calculator never fails; it        │
//! │  reports suspicious results through `TotalsResult::anomaly`.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while editing a cart or invoice draft.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced part has no line in the cart.
    #[error("Part not in cart: {0}")]
    PartNotInCart(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: String, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the form boundary, before a value becomes part of a
/// [`crate::LineItem`].
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: String, max: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not a number.
    #[error("{field} is not a number: '{value}'")]
    InvalidNumber { field: String, value: String },

    /// Invalid format (e.g., too many decimal places).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// The discount would make the line negative.
    #[error("discount {discount} exceeds line amount {line_amount}")]
    DiscountExceedsLine { discount: String, line_amount: String },
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
        let err = CoreError::QuantityTooLarge {
            requested: "10000".to_string(),
            max: 9999,
        };
        assert_eq!(err.to_string(), "Quantity 10000 exceeds maximum allowed (9999)");

        let err = CoreError::PartNotInCart("P-1".to_string());
        assert_eq!(err.to_string(), "Part not in cart: P-1");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity is required");

        let err = ValidationError::InvalidNumber {
            field: "price".to_string(),
            value: "12,x".to_string(),
        };
        assert_eq!(err.to_string(), "price is not a number: '12,x'");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
