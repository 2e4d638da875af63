//! # Cart Module
//!
//! Pure validation and pricing of a sale request.
//!
//! ## Where This Sits
//! ```text
//! SaleRequest (JSON from the till)
//!      │
//!      ▼  SaleRequest::validate   ← THIS MODULE, no I/O
//! ValidatedCart
//!   ├── lines    one PricedLine per request line, in request order
//!   ├── demand   product_id → Σ quantity, sorted by product_id
//!   └── subtotal / total
//!      │
//!      ▼  stockbook-db SaleProcessor (locks, checks stock, writes)
//! CompletedSale
//! ```
//!
//! Duplicate product ids stay as separate lines (one sale item and one
//! movement each) but their quantities are summed into one demand figure, so
//! `P1 × 2` plus `P1 × 4` is checked as 6 against stock, never as 2 and 4
//! independently.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::PaymentMethod;
use crate::validation;

// =============================================================================
// Request Types
// =============================================================================

/// One requested line: which product, how much, at what unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub product_id: String,
    pub quantity: Quantity,
    pub unit_price: Money,
}

/// A sale as submitted by the till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub store_id: String,
    pub cashier_id: String,
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SaleRequest {
    /// Starts a cash sale with no discount or tax.
    pub fn new(store_id: impl Into<String>, cashier_id: impl Into<String>) -> Self {
        SaleRequest {
            store_id: store_id.into(),
            cashier_id: cashier_id.into(),
            items: Vec::new(),
            discount: Money::zero(),
            tax: Money::zero(),
            payment_method: PaymentMethod::Cash,
            customer_id: None,
            notes: None,
        }
    }

    /// Appends a line.
    pub fn with_item(
        mut self,
        product_id: impl Into<String>,
        quantity: Quantity,
        unit_price: Money,
    ) -> Self {
        self.items.push(LineItemRequest {
            product_id: product_id.into(),
            quantity,
            unit_price,
        });
        self
    }

    /// Validates and prices the request without touching storage.
    ///
    /// ## Rules
    /// - 1 to MAX_CART_ITEMS lines
    /// - each quantity in (0, MAX_ITEM_QUANTITY], each unit price ≥ 0
    /// - discount ≥ 0, tax ≥ 0, total = subtotal − discount + tax ≥ 0
    ///
    /// ## Returns
    /// The priced cart with summed per-product demand.
    pub fn validate(self) -> CoreResult<ValidatedCart> {
        validation::validate_id("store_id", &self.store_id)?;
        validation::validate_id("cashier_id", &self.cashier_id)?;
        validation::validate_cart_size(self.items.len())?;
        if let Some(customer_id) = &self.customer_id {
            validation::validate_id("customer_id", customer_id)?;
        }
        if let Some(notes) = &self.notes {
            validation::validate_note(notes)?;
        }
        validation::validate_price("discount", self.discount)?;
        validation::validate_price("tax", self.tax)?;

        let mut lines = Vec::with_capacity(self.items.len());
        let mut demand: BTreeMap<String, Quantity> = BTreeMap::new();

        for item in self.items {
            validation::validate_id("product_id", &item.product_id)?;
            validation::validate_line_quantity(item.quantity)?;
            validation::validate_price("unit_price", item.unit_price)?;

            let line_total = item
                .unit_price
                .times_quantity(item.quantity)
                .ok_or_else(|| CoreError::invalid("line_total", "amount overflow"))?;

            let summed = demand.entry(item.product_id.clone()).or_default();
            *summed = summed
                .checked_add(item.quantity)
                .ok_or_else(|| CoreError::invalid("quantity", "quantity overflow"))?;

            lines.push(PricedLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total,
            });
        }

        let subtotal = Money::checked_sum(lines.iter().map(|line| line.line_total))
            .ok_or_else(|| CoreError::invalid("subtotal", "amount overflow"))?;
        let total = subtotal
            .checked_sub(self.discount)
            .and_then(|net| net.checked_add(self.tax))
            .ok_or_else(|| CoreError::invalid("total", "amount overflow"))?;
        if total.is_negative() {
            return Err(CoreError::InvalidRequest(ValidationError::Rejected {
                field: "discount".to_string(),
                reason: format!(
                    "discount {} exceeds subtotal {} plus tax {}",
                    self.discount, subtotal, self.tax
                ),
            }));
        }

        Ok(ValidatedCart {
            store_id: self.store_id,
            cashier_id: self.cashier_id,
            customer_id: self.customer_id,
            payment_method: self.payment_method,
            notes: self.notes,
            lines,
            demand,
            subtotal,
            discount: self.discount,
            tax: self.tax,
            total,
        })
    }
}

// =============================================================================
// Validated Cart
// =============================================================================

/// A request line with its computed total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Output of [`SaleRequest::validate`]. Only constructible through validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCart {
    pub store_id: String,
    pub cashier_id: String,
    pub customer_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    lines: Vec<PricedLine>,
    demand: BTreeMap<String, Quantity>,
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl ValidatedCart {
    /// Lines in request order.
    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    /// Summed demand per distinct product, ascending by product id.
    ///
    /// The processor locks products in this order.
    pub fn demand(&self) -> impl Iterator<Item = (&str, Quantity)> {
        self.demand.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    pub fn demand_for(&self, product_id: &str) -> Option<Quantity> {
        self.demand.get(product_id).copied()
    }

    pub fn distinct_products(&self) -> usize {
        self.demand.len()
    }
}

// =============================================================================
// Receipt Numbers
// =============================================================================

/// Prefix shared by every receipt issued by a store on `date`.
pub fn receipt_prefix(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Formats the `sequence`-th receipt of the day: `20261014-0007`.
pub fn receipt_number(date: NaiveDate, sequence: i64) -> String {
    format!("{}-{:04}", receipt_prefix(date), sequence)
}

// =============================================================================
// Unit Tests
// =============================================================================
