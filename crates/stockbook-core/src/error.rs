//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                      │
//! │  ├── ValidationError  - Field-level input failures                      │
//! │  ├── CoreError        - Business rule failures                          │
//! │  └── ErrorKind        - Stable machine-readable category                │
//! │                                                                         │
//! │  stockbook-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── LedgerError      - CoreError | DbError, what callers receive       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → ErrorReport          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::quantity::Quantity;
use crate::quota::QuotaResource;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule failures.
///
/// Every variant maps onto exactly one [`ErrorKind`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed input, an inactive product, a reserved movement reason.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// Entity is absent or belongs to another store.
    ///
    /// Foreign-store rows are reported exactly like missing rows so a caller
    /// cannot probe for ids in other tenants.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Demand exceeds stock on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: P1 × 2, P1 × 4   (demand summed: 6)
    ///      │
    ///      ▼
    /// Locked read: stock = 5.000
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "COKE", available: 5.000, requested: 6.000 }
    ///      │
    ///      ▼
    /// Nothing written, transaction rolled back
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        sku: String,
        available: Quantity,
        requested: Quantity,
    },

    /// An owner's plan does not allow another store or user.
    #[error("Quota exceeded for {resource}: {current_count} of {max_allowed} ({reason})")]
    QuotaExceeded {
        resource: QuotaResource,
        current_count: i64,
        max_allowed: i64,
        reason: String,
    },

    /// A derived figure does not fit in the money range.
    ///
    /// Raised when totals built from individually valid rows overflow.
    #[error("{figure} exceeds the representable amount")]
    Overflow { figure: &'static str },
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for a request-level failure that is not tied to one field
    /// format rule (inactive product, reserved reason).
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidRequest(ValidationError::Rejected {
            field: field.to_string(),
            reason: reason.into(),
        })
    }

    /// Returns the stable category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            CoreError::Overflow { .. } => ErrorKind::Internal,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before anything touches the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, too many decimal places).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate SKU).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Well-formed input that the current state refuses.
    #[error("{field}: {reason}")]
    Rejected { field: String, reason: String },
}

// =============================================================================
// Error Kind & Report
// =============================================================================

/// Machine-readable error category for programmatic handling.
///
/// ## Retry Semantics
/// ```text
/// INVALID_REQUEST     fix input
/// INSUFFICIENT_STOCK  adjust cart, retry
/// BUSY                retry with backoff
/// QUOTA_EXCEEDED      upgrade plan, no automatic retry
/// NOT_FOUND           no retry
/// INTERNAL            request fails
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidRequest,
    InsufficientStock,
    Busy,
    QuotaExceeded,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// Whether the same request may succeed if simply retried later.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Busy)
    }

    /// The wire name (`"INSUFFICIENT_STOCK"`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorKind::Busy => "BUSY",
            ErrorKind::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized error sent to callers.
///
/// ## JSON Format
/// ```json
/// {
///   "kind": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for COKE-330: available 2.000, requested 3.000"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&CoreError> for ErrorReport {
    fn from(err: &CoreError) -> Self {
        ErrorReport {
            kind: err.kind(),
            message: err.to_string(),
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
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: "p1".to_string(),
            sku: "COKE-330".to_string(),
            available: Quantity::from_units(3),
            requested: Quantity::from_units(5),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for COKE-330: available 3.000, requested 5.000"
        );
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    }

    #[test]
    fn test_validation_converts_to_invalid_request() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::InvalidRequest(_)));
        assert_eq!(core_err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(core_err.to_string(), "Invalid request: sku is required");
    }

    #[test]
    fn test_error_kind_serializes_screaming_snake() {
        let report = ErrorReport::from(&CoreError::not_found("Product", "abc"));
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"kind":"NOT_FOUND","message":"Product not found: abc"}"#);
    }

    #[test]
    fn test_overflow_is_internal() {
        let err = CoreError::Overflow { figure: "total_income" };
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "total_income exceeds the representable amount");
    }

    #[test]
    fn test_only_busy_is_retryable() {
        assert!(ErrorKind::Busy.is_retryable());
        assert!(!ErrorKind::InsufficientStock.is_retryable());
        assert!(!ErrorKind::QuotaExceeded.is_retryable());
        assert_eq!(ErrorKind::QuotaExceeded.to_string(), "QUOTA_EXCEEDED");
    }
}
