//! # Validation Module
//!
//! Input validation utilities for Stockbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization                                               │
//! │  └── Money / Quantity reject excess decimal places                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Field rules, run before a transaction is opened                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── CHECK (stock >= 0), CHECK (quantity > 0)                           │
//! │  ├── UNIQUE (store_id, sku), UNIQUE (store_id, receipt_number)          │
//! │  └── Append-only triggers on the ledger tables                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::quantity::Quantity;
//! use stockbook_core::validation::{validate_line_quantity, validate_sku};
//!
//! validate_sku("COKE-330").unwrap();
//! validate_line_quantity(Quantity::from_units(5)).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::{MAX_ADJUSTMENT_QUANTITY, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a barcode: 4 to 32 ASCII digits or letters.
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.len() < 4 || barcode.len() > 32 {
        return Err(ValidationError::OutOfRange {
            field: "barcode length".to_string(),
            min: "4".to_string(),
            max: "32".to_string(),
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only ASCII letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)
}

/// Validates store, customer, plan and category names.
pub fn validate_display_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_text(field, name, 120)
}

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a free-text note (sale notes, adjustment notes).
pub fn validate_note(note: &str) -> ValidationResult<()> {
    if note.chars().count() > 500 {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: 500,
        });
    }

    Ok(())
}

/// Validates an email address: one `@` with a non-empty local part and a
/// dotted domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all/default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates an entity id supplied by a caller.
///
/// Ids are opaque strings; only emptiness and length are checked.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Sale line: quantity "2.500"                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_line_quantity ← THIS FUNCTION                                 │
/// │       │                                                                 │
/// │       ├── qty <= 0?   → Error: "quantity must be positive"              │
/// │       │                                                                 │
/// │       ├── qty > 999?  → Error: "quantity must be between ..."           │
/// │       │                                                                 │
/// │       └── OK → line joins the cart                                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_line_quantity(qty: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: Quantity::from_milli(1).to_string(),
            max: MAX_ITEM_QUANTITY.to_string(),
        });
    }

    Ok(())
}

/// Validates a signed manual adjustment: non-zero and within bounds.
pub fn validate_adjustment_quantity(qty: Quantity) -> ValidationResult<()> {
    if qty.is_zero() {
        return Err(ValidationError::Rejected {
            field: "quantity".to_string(),
            reason: "adjustment must not be zero".to_string(),
        });
    }

    if qty.abs() > MAX_ADJUSTMENT_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: (-MAX_ADJUSTMENT_QUANTITY).to_string(),
            max: MAX_ADJUSTMENT_QUANTITY.to_string(),
        });
    }

    Ok(())
}

/// Validates a stored stock figure (initial stock, reorder threshold).
pub fn validate_stock_level(field: &str, qty: Quantity) -> ValidationResult<()> {
    if qty.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if qty > MAX_ADJUSTMENT_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: Quantity::zero().to_string(),
            max: MAX_ADJUSTMENT_QUANTITY.to_string(),
        });
    }

    Ok(())
}

/// Validates a price, discount or tax amount.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use stockbook_core::money::Money;
/// use stockbook_core::validation::validate_price;
///
/// assert!(validate_price("price", Money::from_cents(1099)).is_ok());
/// assert!(validate_price("price", Money::zero()).is_ok());
/// assert!(validate_price("price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a plan limit (stores or users). Zero is a valid limit.
pub fn validate_limit(field: &str, limit: i64) -> ValidationResult<()> {
    if !(0..=10_000).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: "10000".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of lines).
///
/// ## Rules
/// - At least one line
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: "1".to_string(),
            max: MAX_CART_ITEMS.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
