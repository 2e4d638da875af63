//! # Cash Flow Repository
//!
//! Income and expenses that are not sales: credit sales to customers,
//! supplier payments, rent. Unpaid income entries with a customer are the
//! store's receivables until settled.
//!
//! ```text
//! record(unpaid income, customer C) ──► receivable for C
//!                │
//!                ▼
//! settle(entry)  ──► payment_status = 'paid' ──► no longer receivable
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use stockbook_core::{new_id, CashFlowEntry, CoreError, NewCashFlowEntry, PaymentStatus};

use crate::error::{DbResult, LedgerError, LedgerResult};
use crate::repository::{customer, tenancy};

/// Repository for cash-flow entries.
#[derive(Debug, Clone)]
pub struct CashFlowRepository {
    pool: SqlitePool,
}

impl CashFlowRepository {
    /// Creates a new CashFlowRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashFlowRepository { pool }
    }

    /// Records an entry.
    ///
    /// ## Returns
    /// * `Ok(CashFlowEntry)` - The stored entry
    /// * `InvalidRequest` - Validation failed
    /// * `NotFound` - Store, customer or product missing from this store
    pub async fn record(&self, input: &NewCashFlowEntry) -> LedgerResult<CashFlowEntry> {
        input.validate()?;

        let entry = CashFlowEntry {
            id: new_id(),
            store_id: input.store_id.clone(),
            flow_type: input.flow_type,
            amount: input.amount,
            payment_status: input.payment_status,
            category: input.category.trim().to_string(),
            description: input.description.clone(),
            customer_id: input.customer_id.clone(),
            product_id: input.product_id.clone(),
            entry_date: input.entry_date,
            created_by: input.created_by.clone(),
            created_at: Utc::now(),
        };

        debug!(
            store_id = %entry.store_id,
            flow_type = ?entry.flow_type,
            amount = %entry.amount,
            "Recording cash-flow entry"
        );

        let mut tx = self.pool.begin().await?;

        if !tenancy::lock_active_store(&mut tx, &entry.store_id).await? {
            return Err(LedgerError::not_found("Store", &entry.store_id));
        }

        if let Some(customer_id) = &entry.customer_id {
            if !customer::exists_in_store(&mut tx, &entry.store_id, customer_id).await? {
                return Err(LedgerError::not_found("Customer", customer_id));
            }
        }

        if let Some(product_id) = &entry.product_id {
            let found: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1 AND store_id = ?2")
                    .bind(product_id)
                    .bind(&entry.store_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if found.is_none() {
                return Err(LedgerError::not_found("Product", product_id));
            }
        }

        sqlx::query(
            "INSERT INTO cash_flow_entries (
                id, store_id, flow_type, amount, payment_status, category, description,
                customer_id, product_id, entry_date, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&entry.id)
        .bind(&entry.store_id)
        .bind(entry.flow_type)
        .bind(entry.amount)
        .bind(entry.payment_status)
        .bind(&entry.category)
        .bind(&entry.description)
        .bind(&entry.customer_id)
        .bind(&entry.product_id)
        .bind(entry.entry_date)
        .bind(&entry.created_by)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(entry)
    }

    /// Marks an unpaid entry as paid.
    ///
    /// ## Returns
    /// * `NotFound` - No such entry in this store
    /// * `InvalidRequest` - The entry is already paid
    pub async fn settle(&self, store_id: &str, id: &str) -> LedgerResult<CashFlowEntry> {
        let settled = sqlx::query_as::<_, CashFlowEntry>(concat!(
            "UPDATE cash_flow_entries SET payment_status = ?3
             WHERE id = ?1 AND store_id = ?2 AND payment_status = ?4
             RETURNING ",
            cash_flow_columns!()
        ))
        .bind(id)
        .bind(store_id)
        .bind(PaymentStatus::Paid)
        .bind(PaymentStatus::Unpaid)
        .fetch_optional(&self.pool)
        .await?;

        match settled {
            Some(entry) => {
                info!(id = %id, amount = %entry.amount, "Cash-flow entry settled");
                Ok(entry)
            }
            None => match self.get(store_id, id).await? {
                Some(_) => Err(LedgerError::from(CoreError::invalid(
                    "payment_status",
                    "entry is already paid",
                ))),
                None => Err(LedgerError::not_found("CashFlowEntry", id)),
            },
        }
    }

    pub async fn get(&self, store_id: &str, id: &str) -> DbResult<Option<CashFlowEntry>> {
        let entry = sqlx::query_as::<_, CashFlowEntry>(concat!(
            "SELECT ",
            cash_flow_columns!(),
            " FROM cash_flow_entries WHERE id = ?1 AND store_id = ?2"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Entries booked on `date`, in recording order.
    pub async fn list_for_date(&self, store_id: &str, date: NaiveDate) -> DbResult<Vec<CashFlowEntry>> {
        let entries = sqlx::query_as::<_, CashFlowEntry>(concat!(
            "SELECT ",
            cash_flow_columns!(),
            " FROM cash_flow_entries
              WHERE store_id = ?1 AND entry_date = ?2
              ORDER BY created_at, rowid"
        ))
        .bind(store_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

#[derive(sqlx::FromRow)]
struct ReceivableRow {
    #[sqlx(flatten)]
    entry: CashFlowEntry,
    customer_name: String,
}

/// Unpaid income entries that name a customer, oldest first, each with the
/// customer's name.
pub(crate) async fn unpaid_income(
    conn: &mut SqliteConnection,
    store_id: &str,
) -> DbResult<Vec<(CashFlowEntry, String)>> {
    let rows = sqlx::query_as::<_, ReceivableRow>(concat!(
        "SELECT ",
        cash_flow_columns!(),
        ", COALESCE((SELECT c.name FROM customers c
                     WHERE c.id = cash_flow_entries.customer_id), '') AS customer_name
         FROM cash_flow_entries
         WHERE store_id = ?1
           AND flow_type = 'income'
           AND payment_status = 'unpaid'
           AND customer_id IS NOT NULL
         ORDER BY entry_date, created_at, rowid"
    ))
    .bind(store_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.entry, row.customer_name))
        .collect())
}
