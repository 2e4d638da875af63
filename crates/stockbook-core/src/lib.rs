//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate holds the business rules of the retail back office as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Callers (till UI, dashboard, CLI)              │   │
//! │  │    SaleRequest ──► CompletedSale     DailyStats, Receivables    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockbook-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌────────┐ ┌────────┐ ┌─────────┐   │   │
//! │  │   │  types  │ │  money   │ │  cart  │ │ quota  │ │  stats  │   │   │
//! │  │   │ Product │ │  Money   │ │ Sale   │ │Decision│ │ Daily   │   │   │
//! │  │   │  Sale   │ │ Quantity │ │Request │ │ Limits │ │ Recon.  │   │   │
//! │  │   └─────────┘ └──────────┘ └────────┘ └────────┘ └─────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   stockbook-db (Ledger Store)                   │   │
//! │  │     SQLite, transactions, sale processor, reports, quota gate   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Product, Sale, InventoryMovement, etc.)
//! - [`money`] - Money in integer cents
//! - [`quantity`] - Stock quantities in integer thousandths
//! - [`cart`] - Sale request validation and pricing
//! - [`quota`] - Plan-limit decisions
//! - [`stats`] - Report shapes and aggregate arithmetic
//! - [`error`] - Domain error types and the caller-facing error report
//! - [`validation`] - Field rules
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::{Money, Quantity, SaleRequest};
//!
//! let cart = SaleRequest::new("store-1", "cashier-1")
//!     .with_item("p1", Quantity::from_units(3), "10.00".parse::<Money>().unwrap())
//!     .validate()
//!     .unwrap();
//!
//! assert_eq!(cart.total.to_string(), "30.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod quantity;
pub mod quota;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{LineItemRequest, PricedLine, SaleRequest, ValidatedCart};
pub use error::{CoreError, CoreResult, ErrorKind, ErrorReport, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use quota::{PlanLimits, QuotaDecision, QuotaResource};
pub use stats::{DailyStats, PeriodSummary, Receivable, StockReconciliation, TopProduct};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale.
///
/// ## Business Reason
/// Keeps one sale transaction (and the locks it holds) short.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on a single sale line.
///
/// ## Business Reason
/// Catches typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: Quantity = Quantity::from_units(999);

/// Largest magnitude of a single manual stock adjustment.
pub const MAX_ADJUSTMENT_QUANTITY: Quantity = Quantity::from_units(1_000_000);
