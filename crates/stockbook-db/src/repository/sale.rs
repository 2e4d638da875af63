//! # Sale Repository
//!
//! Reads of completed sales plus the insert helpers the sale processor
//! composes inside its transaction.
//!
//! ## Sale Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale (header)                                                          │
//! │  ├── receipt_number: "20261014-0007"   (per store, per UTC day)         │
//! │  ├── subtotal / discount / tax / total                                  │
//! │  └── SaleItem[] (line items)                                            │
//! │      ├── product_id, sku_snapshot, name_snapshot                        │
//! │      ├── quantity, unit_price                                           │
//! │      └── line_total = round(quantity × unit_price)                      │
//! │                                                                         │
//! │  Sales and items are append-only: triggers reject UPDATE and DELETE.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use stockbook_core::cart::{receipt_number, receipt_prefix};
use stockbook_core::stats::utc_day_bounds;
use stockbook_core::{Sale, SaleItem};

use crate::error::{DbResult, LedgerResult};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale header by ID within a store.
    pub async fn get(&self, store_id: &str, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(concat!(
            "SELECT ",
            sale_columns!(),
            " FROM sales WHERE id = ?1 AND store_id = ?2"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale by its receipt number (e.g., "20261014-0007").
    pub async fn get_by_receipt(&self, store_id: &str, receipt: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(concat!(
            "SELECT ",
            sale_columns!(),
            " FROM sales WHERE receipt_number = ?1 AND store_id = ?2"
        ))
        .bind(receipt.trim())
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets the line items of a sale, in insertion order.
    ///
    /// A sale from another store yields no items.
    pub async fn items(&self, store_id: &str, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(concat!(
            "SELECT ",
            sale_item_columns!(),
            " FROM sale_items
              WHERE sale_id = ?1
                AND EXISTS (SELECT 1 FROM sales s WHERE s.id = ?1 AND s.store_id = ?2)
              ORDER BY rowid"
        ))
        .bind(sale_id)
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sales with `from <= created_at < to`, oldest first.
    pub async fn list_between(
        &self,
        store_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        debug!(store_id = %store_id, from = %from, to = %to, "Listing sales");

        let sales = sqlx::query_as::<_, Sale>(concat!(
            "SELECT ",
            sale_columns!(),
            " FROM sales
              WHERE store_id = ?1 AND created_at >= ?2 AND created_at < ?3
              ORDER BY created_at, receipt_number"
        ))
        .bind(store_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists the sales of one UTC calendar day.
    pub async fn list_for_date(&self, store_id: &str, date: NaiveDate) -> LedgerResult<Vec<Sale>> {
        let (from, to) = utc_day_bounds(date)?;
        Ok(self.list_between(store_id, from, to).await?)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Next receipt number for `date` in this store.
///
/// Must run after the store row is locked so two sales cannot read the same
/// maximum. The `UNIQUE (store_id, receipt_number)` constraint backs this up.
pub(crate) async fn next_receipt_number(
    conn: &mut SqliteConnection,
    store_id: &str,
    date: NaiveDate,
) -> DbResult<String> {
    let prefix = receipt_prefix(date);

    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(CAST(substr(receipt_number, 10) AS INTEGER)), 0) + 1
         FROM sales
         WHERE store_id = ?1 AND receipt_number LIKE ?2 || '-%'",
    )
    .bind(store_id)
    .bind(&prefix)
    .fetch_one(&mut *conn)
    .await?;

    Ok(receipt_number(date, next))
}

pub(crate) async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO sales (
            id, store_id, cashier_id, receipt_number, customer_id,
            subtotal, discount, tax, total, payment_method, status, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    )
    .bind(&sale.id)
    .bind(&sale.store_id)
    .bind(&sale.cashier_id)
    .bind(&sale.receipt_number)
    .bind(&sale.customer_id)
    .bind(sale.subtotal)
    .bind(sale.discount)
    .bind(sale.tax)
    .bind(sale.total)
    .bind(sale.payment_method)
    .bind(sale.status)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO sale_items (
            id, sale_id, product_id, sku_snapshot, name_snapshot,
            quantity, unit_price, line_total, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.sku_snapshot)
    .bind(&item.name_snapshot)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.line_total)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
