//! # Repository Module
//!
//! Database repository implementations for Stockbook.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │  db.products().get(store_id, id)                                │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── pool methods      pub, each call is its own statement or tx        │
//! │  └── tx functions      pub(crate), take &mut SqliteConnection so the    │
//! │                        services can compose them in one transaction     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Every read is scoped by store_id. A row in another store is            │
//! │  indistinguishable from a missing row: both come back as None.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalogue and stock totals
//! - [`SaleRepository`](sale::SaleRepository) - Sale headers and items
//! - [`MovementRepository`](movement::MovementRepository) - Inventory ledger
//! - [`CashFlowRepository`](cash_flow::CashFlowRepository) - Non-sale income and expenses
//! - [`CustomerRepository`](customer::CustomerRepository) - Store customers
//! - [`TenancyRepository`](tenancy::TenancyRepository) - Stores and users
//! - [`SubscriptionRepository`](subscription::SubscriptionRepository) - Plans and subscriptions

pub mod cash_flow;
pub mod customer;
pub mod movement;
pub mod product;
pub mod sale;
pub mod subscription;
pub mod tenancy;

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
