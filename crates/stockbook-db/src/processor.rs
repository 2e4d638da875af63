//! # Sale Processor
//!
//! Turns a validated cart into a committed sale: header, line items, one
//! `out` movement per line and the matching stock decrements, all or
//! nothing.
//!
//! ## Transaction Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleRequest::validate()        pure: sizes, prices, summed demand      │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │   1. lock store row             first statement is a write: takes the   │
//! │                                 writer lock, waits ≤ lock_timeout       │
//! │   2. customer belongs to store?                                         │
//! │   3. for each product (sorted by id):                                   │
//! │        lock-read → exists? active? stock ≥ summed demand?               │
//! │                  ── nothing written before every check passes ──        │
//! │   4. next receipt number, INSERT sale                                   │
//! │   5. for each line: INSERT item, INSERT movement, stock -= quantity     │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the transaction, which rolls back.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two sales for the same product therefore serialize on the writer lock:
//! the second one reads the stock the first one committed.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use stockbook_core::{
    new_id, CompletedSale, CoreError, InventoryMovement, MovementReason, MovementType, Product,
    Quantity, Sale, SaleItem, SaleRequest, SaleStatus, ValidatedCart,
};

use crate::error::{LedgerError, LedgerResult};
use crate::repository::{customer, movement, product, sale, tenancy};

/// Runs sale transactions.
///
/// ## Usage
/// ```rust,ignore
/// let request = SaleRequest::new(store_id, cashier_id)
///     .with_item(product_id, Quantity::from_units(3), "10.00".parse()?);
///
/// let done = db.processor().process_sale(request).await?;
/// println!("{} {}", done.sale.receipt_number, done.sale.total);
/// ```
#[derive(Debug, Clone)]
pub struct SaleProcessor {
    pool: SqlitePool,
}

impl SaleProcessor {
    pub fn new(pool: SqlitePool) -> Self {
        SaleProcessor { pool }
    }

    /// Validates, prices and commits a sale.
    ///
    /// ## Returns
    /// * `Ok(CompletedSale)` - Everything the sale wrote
    /// * `InvalidRequest` - Bad input, or an inactive product
    /// * `NotFound` - Store, customer or product missing from this store
    /// * `InsufficientStock` - Summed demand for a product exceeds its stock
    /// * `Busy` - Lock not acquired within the lock timeout
    ///
    /// Every error leaves the ledger unchanged.
    pub async fn process_sale(&self, request: SaleRequest) -> LedgerResult<CompletedSale> {
        let store_id = request.store_id.clone();

        let cart = match request.validate() {
            Ok(cart) => cart,
            Err(err) => {
                warn!(store_id = %store_id, error = %err, "Sale rejected");
                return Err(err.into());
            }
        };

        debug!(
            store_id = %cart.store_id,
            lines = cart.lines().len(),
            products = cart.distinct_products(),
            total = %cart.total,
            "Processing sale"
        );

        match self.commit_cart(&cart).await {
            Ok(done) => {
                info!(
                    sale_id = %done.sale.id,
                    receipt = %done.sale.receipt_number,
                    total = %done.sale.total,
                    items = done.items.len(),
                    "Sale committed"
                );
                Ok(done)
            }
            Err(err) => {
                warn!(store_id = %cart.store_id, kind = %err.kind(), error = %err, "Sale rejected");
                Err(err)
            }
        }
    }

    async fn commit_cart(&self, cart: &ValidatedCart) -> LedgerResult<CompletedSale> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        if !tenancy::lock_active_store(&mut tx, &cart.store_id).await? {
            return Err(LedgerError::not_found("Store", &cart.store_id));
        }

        if let Some(customer_id) = &cart.customer_id {
            if !customer::exists_in_store(&mut tx, &cart.store_id, customer_id).await? {
                return Err(LedgerError::not_found("Customer", customer_id));
            }
        }

        // Lock in ascending id order, check everything before the first insert.
        let mut locked: HashMap<&str, Product> = HashMap::with_capacity(cart.distinct_products());
        for (product_id, demand) in cart.demand() {
            let row = product::lock_for_update(&mut tx, &cart.store_id, product_id)
                .await?
                .ok_or_else(|| LedgerError::not_found("Product", product_id))?;

            if !row.is_active {
                return Err(CoreError::invalid(
                    "product_id",
                    format!("product {} is not active", row.sku),
                )
                .into());
            }

            if !row.can_supply(demand) {
                return Err(insufficient(&row, demand));
            }

            locked.insert(product_id, row);
        }

        let receipt_number = sale::next_receipt_number(&mut tx, &cart.store_id, now.date_naive()).await?;

        let header = Sale {
            id: new_id(),
            store_id: cart.store_id.clone(),
            cashier_id: cart.cashier_id.clone(),
            receipt_number,
            customer_id: cart.customer_id.clone(),
            subtotal: cart.subtotal,
            discount: cart.discount,
            tax: cart.tax,
            total: cart.total,
            payment_method: cart.payment_method,
            status: SaleStatus::Completed,
            notes: cart.notes.clone(),
            created_at: now,
        };
        sale::insert_sale(&mut tx, &header).await?;

        let mut items = Vec::with_capacity(cart.lines().len());
        let mut movements = Vec::with_capacity(cart.lines().len());

        for line in cart.lines() {
            let row = locked
                .get(line.product_id.as_str())
                .ok_or_else(|| LedgerError::not_found("Product", &line.product_id))?;

            let item = SaleItem {
                id: new_id(),
                sale_id: header.id.clone(),
                product_id: row.id.clone(),
                sku_snapshot: row.sku.clone(),
                name_snapshot: row.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total,
                created_at: now,
            };
            sale::insert_item(&mut tx, &item).await?;

            let out = InventoryMovement {
                id: new_id(),
                store_id: cart.store_id.clone(),
                product_id: row.id.clone(),
                movement_type: MovementType::Out,
                quantity: line.quantity,
                reason: MovementReason::Sale,
                reference_id: Some(header.id.clone()),
                note: None,
                actor_id: cart.cashier_id.clone(),
                created_at: now,
            };
            movement::insert(&mut tx, &out).await?;

            // Guarded in SQL as well; unreachable after the demand check.
            if product::apply_stock_delta(&mut tx, &cart.store_id, &row.id, -line.quantity, now)
                .await?
                .is_none()
            {
                return Err(insufficient(row, line.quantity));
            }

            items.push(item);
            movements.push(out);
        }

        tx.commit().await?;

        Ok(CompletedSale {
            sale: header,
            items,
            movements,
        })
    }
}

fn insufficient(row: &Product, requested: Quantity) -> LedgerError {
    CoreError::InsufficientStock {
        product_id: row.id.clone(),
        sku: row.sku.clone(),
        available: row.stock,
        requested,
    }
    .into()
}
