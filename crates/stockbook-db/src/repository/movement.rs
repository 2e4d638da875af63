//! # Movement Repository
//!
//! The inventory ledger: one append-only row per stock change.
//!
//! ```text
//! product.stock == product.initial_stock + Σ(+q for 'in', −q for 'out')
//! ```
//!
//! Rows are inserted only from inside the sale processor and the inventory
//! service, in the same transaction as the stock delta they describe.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use stockbook_core::{InventoryMovement, Quantity};

use crate::error::DbResult;

/// Repository for inventory movement reads.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// History of one product, oldest first.
    pub async fn for_product(&self, store_id: &str, product_id: &str) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(concat!(
            "SELECT ",
            movement_columns!(),
            " FROM inventory_movements
              WHERE store_id = ?1 AND product_id = ?2
              ORDER BY created_at, rowid"
        ))
        .bind(store_id)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Movements written for one reference (a sale id).
    pub async fn for_reference(&self, store_id: &str, reference_id: &str) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(concat!(
            "SELECT ",
            movement_columns!(),
            " FROM inventory_movements
              WHERE store_id = ?1 AND reference_id = ?2
              ORDER BY rowid"
        ))
        .bind(store_id)
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Movements with `from <= created_at < to`, oldest first.
    pub async fn list_between(
        &self,
        store_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(concat!(
            "SELECT ",
            movement_columns!(),
            " FROM inventory_movements
              WHERE store_id = ?1 AND created_at >= ?2 AND created_at < ?3
              ORDER BY created_at, rowid"
        ))
        .bind(store_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Signed sum of a product's movements.
    pub async fn signed_total(&self, store_id: &str, product_id: &str) -> DbResult<Quantity> {
        let total: Quantity = sqlx::query_scalar(
            "SELECT COALESCE(SUM(CASE movement_type WHEN 'in' THEN quantity ELSE -quantity END), 0)
             FROM inventory_movements
             WHERE store_id = ?1 AND product_id = ?2",
        )
        .bind(store_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

pub(crate) async fn insert(conn: &mut SqliteConnection, movement: &InventoryMovement) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO inventory_movements (
            id, store_id, product_id, movement_type, quantity, reason,
            reference_id, note, actor_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(&movement.id)
    .bind(&movement.store_id)
    .bind(&movement.product_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(movement.reason)
    .bind(&movement.reference_id)
    .bind(&movement.note)
    .bind(&movement.actor_id)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
