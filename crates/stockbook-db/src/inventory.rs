//! # Inventory Service
//!
//! Manual stock changes (restock, return, damage, count corrections) and the
//! ledger reconciliation check.
//!
//! ## Adjustment Flow
//! ```text
//! StockAdjustment { quantity: -2.000, reason: damage }
//!      │  validate: ≠ 0, |q| bounded, reason ≠ sale, direction fits reason
//!      ▼
//! BEGIN
//!   lock store → lock product → stock + q ≥ 0 ?
//!   INSERT movement (out, 2.000, damage)
//!   UPDATE products SET stock = stock - 2.000
//! COMMIT
//! ```
//! Same lock → append movement → update total pattern as a sale, so the
//! reconciliation invariant holds after every adjustment.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use stockbook_core::{
    new_id, AdjustedStock, CoreError, InventoryMovement, MovementType, Quantity, StockAdjustment,
    StockReconciliation,
};

use crate::error::{LedgerError, LedgerResult};
use crate::repository::{movement, product, tenancy};

/// Stock adjustments and reconciliation.
#[derive(Debug, Clone)]
pub struct InventoryService {
    pool: SqlitePool,
}

impl InventoryService {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryService { pool }
    }

    /// Applies a signed manual stock change.
    ///
    /// Inactive products can still be adjusted (e.g. writing off remaining
    /// stock after delisting).
    ///
    /// ## Returns
    /// * `Ok(AdjustedStock)` - The product after the change and its movement
    /// * `InvalidRequest` - Zero or oversized quantity, `sale` reason, or a
    ///   direction the reason does not allow
    /// * `NotFound` - Store or product missing
    /// * `InsufficientStock` - A removal larger than current stock
    pub async fn adjust_stock(&self, adjustment: &StockAdjustment) -> LedgerResult<AdjustedStock> {
        if let Err(err) = adjustment.validate() {
            warn!(product_id = %adjustment.product_id, error = %err, "Adjustment rejected");
            return Err(err.into());
        }

        debug!(
            product_id = %adjustment.product_id,
            quantity = %adjustment.quantity,
            reason = ?adjustment.reason,
            "Adjusting stock"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        if !tenancy::lock_active_store(&mut tx, &adjustment.store_id).await? {
            return Err(LedgerError::not_found("Store", &adjustment.store_id));
        }

        let current = product::lock_for_update(&mut tx, &adjustment.store_id, &adjustment.product_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Product", &adjustment.product_id))?;

        let insufficient = || -> LedgerError {
            CoreError::InsufficientStock {
                product_id: current.id.clone(),
                sku: current.sku.clone(),
                available: current.stock,
                requested: adjustment.quantity.abs(),
            }
            .into()
        };

        if adjustment.quantity.is_negative() && !current.can_supply(adjustment.quantity.abs()) {
            warn!(sku = %current.sku, stock = %current.stock, quantity = %adjustment.quantity, "Adjustment rejected");
            return Err(insufficient());
        }

        let entry = InventoryMovement {
            id: new_id(),
            store_id: adjustment.store_id.clone(),
            product_id: current.id.clone(),
            movement_type: MovementType::for_delta(adjustment.quantity),
            quantity: adjustment.quantity.abs(),
            reason: adjustment.reason,
            reference_id: None,
            note: adjustment.note.clone(),
            actor_id: adjustment.actor_id.clone(),
            created_at: now,
        };
        movement::insert(&mut tx, &entry).await?;

        let updated = product::apply_stock_delta(
            &mut tx,
            &adjustment.store_id,
            &current.id,
            adjustment.quantity,
            now,
        )
        .await?
        .ok_or_else(insufficient)?;

        tx.commit().await?;

        info!(
            sku = %updated.sku,
            before = %current.stock,
            after = %updated.stock,
            reason = ?entry.reason,
            "Stock adjusted"
        );

        Ok(AdjustedStock {
            product: updated,
            movement: entry,
        })
    }

    /// Checks `stock == initial_stock + Σ signed movements` for every product
    /// of the store, ordered by SKU.
    pub async fn reconcile(&self, store_id: &str) -> LedgerResult<Vec<StockReconciliation>> {
        let rows: Vec<(String, String, Quantity, Quantity, Quantity)> = sqlx::query_as(
            "SELECT p.id, p.sku, p.stock, p.initial_stock,
                    COALESCE(SUM(CASE m.movement_type
                                     WHEN 'in' THEN m.quantity
                                     WHEN 'out' THEN -m.quantity
                                 END), 0) AS movement_total
             FROM products p
             LEFT JOIN inventory_movements m ON m.product_id = p.id
             WHERE p.store_id = ?1
             GROUP BY p.id, p.sku, p.stock, p.initial_stock
             ORDER BY p.sku",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        let report: Vec<StockReconciliation> = rows
            .into_iter()
            .map(|(id, sku, stock, initial, total)| StockReconciliation::new(id, sku, stock, initial, total))
            .collect();

        let unbalanced = report.iter().filter(|r| !r.balanced).count();
        if unbalanced > 0 {
            warn!(store_id = %store_id, unbalanced, "Stock does not match movement ledger");
        } else {
            debug!(store_id = %store_id, products = report.len(), "Stock reconciled");
        }

        Ok(report)
    }
}
