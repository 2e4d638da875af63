//! # stockbook-db: Ledger Store for Stockbook
//!
//! This crate owns every database operation of the back office: the ledger
//! repositories, the transactional services that write to them, and the
//! readers that aggregate them. It uses SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  SaleRequest / StockAdjustment / NewStore          report calls         │
//! │       │                                                 │               │
//! │       ▼                                                 ▼               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   Services (own the transaction)       Readers                  │   │
//! │  │   ┌──────────────┐ ┌─────────────┐    ┌───────────────┐        │   │
//! │  │   │ SaleProcessor│ │InventorySvc │    │ ReportService │        │   │
//! │  │   │ QuotaGate    │ │  (adjust)   │    │ (stats, recv) │        │   │
//! │  │   └──────┬───────┘ └──────┬──────┘    └───────┬───────┘        │   │
//! │  │          ▼                ▼                   ▼                │   │
//! │  │   Repositories: product, sale, movement, cash_flow, customer,  │   │
//! │  │                 tenancy, subscription                          │   │
//! │  │          │                                                      │   │
//! │  │   Database (pool.rs) ── Migrations (embedded)                  │   │
//! │  └──────────┼──────────────────────────────────────────────────────┘   │
//! │             ▼                                                           │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              SQLite (WAL, busy_timeout = lock_timeout)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - `DbError`, `LedgerError`
//! - [`repository`] - Store-scoped reads and single-row writes
//! - [`processor`] - The sale transaction
//! - [`inventory`] - Manual stock adjustments and reconciliation
//! - [`reports`] - Daily stats, low stock, receivables, period reports
//! - [`quota`] - Plan limits on stores and users
//! - [`retry`] - Backoff for `Busy` failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("ledger.db")).await?;
//!
//! let sale = db.processor().process_sale(request).await?;
//! let today = db.reports().daily_stats(&store_id, date).await?;
//! ```

// Column lists shared by every query that reads an entity, in FromRow order.
#[macro_use]
mod columns;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod inventory;
pub mod migrations;
pub mod pool;
pub mod processor;
pub mod quota;
pub mod reports;
pub mod repository;
pub mod retry;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, LedgerError, LedgerResult};
pub use pool::{Database, DbConfig};

pub use inventory::InventoryService;
pub use processor::SaleProcessor;
pub use quota::QuotaGate;
pub use reports::ReportService;
pub use retry::{retry_on_busy, RetryPolicy};

// Repository re-exports for convenience
pub use repository::cash_flow::CashFlowRepository;
pub use repository::customer::CustomerRepository;
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::subscription::SubscriptionRepository;
pub use repository::tenancy::TenancyRepository;
