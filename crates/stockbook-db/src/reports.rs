//! # Report Service
//!
//! Read-only aggregates for the dashboard: daily figures, reorder list,
//! receivables, period totals and best sellers.
//!
//! ## Consistent Snapshots
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN (deferred, read only)                                            │
//! │     SELECT ... FROM sales             ┐ one WAL snapshot: a sale        │
//! │     SELECT ... FROM cash_flow_entries ┘ committing in between is either │
//! │  COMMIT                                 in both figures or in neither   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Time Windows
//! Sales are bucketed by `created_at` in the UTC day `[date 00:00, date+1
//! 00:00)`. Cash-flow entries are bucketed by their booked `entry_date`.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use stockbook_core::stats::{group_receivables, utc_day_bounds, FlowTotals, SalesTotals};
use stockbook_core::validation::validate_limit;
use stockbook_core::{CoreError, DailyStats, PeriodSummary, Product, Receivable, TopProduct};

use crate::error::{DbResult, LedgerResult};
use crate::repository::cash_flow;

/// Dashboard aggregates. Every call reads from a single snapshot.
#[derive(Debug, Clone)]
pub struct ReportService {
    pool: SqlitePool,
}

impl ReportService {
    pub fn new(pool: SqlitePool) -> Self {
        ReportService { pool }
    }

    /// Sales and cash flow for one business day.
    ///
    /// ```text
    /// total_income = total_sales + income entries (paid and unpaid)
    /// net_flow     = total_income - expense entries
    /// ```
    pub async fn daily_stats(&self, store_id: &str, date: NaiveDate) -> LedgerResult<DailyStats> {
        let mut tx = self.pool.begin().await?;

        let sales = sales_totals(&mut tx, store_id, date, date).await?;
        let flows = flow_totals(&mut tx, store_id, date, date).await?;

        tx.commit().await?;

        let stats = DailyStats::compose(date, &sales, flows.income, flows.expense)?;
        debug!(
            store_id = %store_id,
            date = %date,
            sales = stats.sales_count,
            net = %stats.net_flow,
            "Daily stats computed"
        );
        Ok(stats)
    }

    /// Active products at or below their reorder threshold, by name.
    pub async fn low_stock(&self, store_id: &str) -> LedgerResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products
              WHERE store_id = ?1 AND is_active = 1 AND stock <= min_stock_level
              ORDER BY name, sku"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(store_id = %store_id, count = products.len(), "Low stock listed");
        Ok(products)
    }

    /// Unpaid income grouped by customer, largest balance first.
    pub async fn accounts_receivable(&self, store_id: &str) -> LedgerResult<Vec<Receivable>> {
        let mut tx = self.pool.begin().await?;
        let rows = cash_flow::unpaid_income(&mut tx, store_id).await?;
        tx.commit().await?;

        Ok(group_receivables(rows)?)
    }

    /// Totals over the inclusive day range `from..=to`.
    ///
    /// ## Returns
    /// * `InvalidRequest` - `from` is after `to`
    pub async fn period_summary(
        &self,
        store_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<PeriodSummary> {
        check_range(from, to)?;

        let mut tx = self.pool.begin().await?;

        let sales = sales_totals(&mut tx, store_id, from, to).await?;
        let flows = flow_totals(&mut tx, store_id, from, to).await?;

        tx.commit().await?;

        Ok(PeriodSummary::compose(from, to, &sales, &flows)?)
    }

    /// Products ranked by quantity sold in `from..=to`, then by revenue.
    pub async fn top_products(
        &self,
        store_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        limit: u32,
    ) -> LedgerResult<Vec<TopProduct>> {
        check_range(from, to)?;
        validate_limit("limit", i64::from(limit))?;

        let (start, _) = utc_day_bounds(from)?;
        let (_, end) = utc_day_bounds(to)?;

        let ranked = sqlx::query_as::<_, TopProduct>(
            "SELECT si.product_id,
                    p.sku,
                    p.name,
                    SUM(si.quantity) AS quantity_sold,
                    SUM(si.line_total) AS revenue,
                    COUNT(*) AS line_count
             FROM sale_items si
             JOIN sales s ON s.id = si.sale_id
             JOIN products p ON p.id = si.product_id
             WHERE s.store_id = ?1 AND s.created_at >= ?2 AND s.created_at < ?3
             GROUP BY si.product_id, p.sku, p.name
             ORDER BY quantity_sold DESC, revenue DESC, p.sku
             LIMIT ?4",
        )
        .bind(store_id)
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(ranked)
    }
}

fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), CoreError> {
    if from > to {
        return Err(CoreError::invalid(
            "from",
            format!("start date {from} is after end date {to}"),
        ));
    }
    Ok(())
}

/// Completed sales created between `from 00:00` and `to+1 00:00` UTC.
async fn sales_totals(
    conn: &mut SqliteConnection,
    store_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> LedgerResult<SalesTotals> {
    let (start, _) = utc_day_bounds(from)?;
    let (_, end) = utc_day_bounds(to)?;

    let totals = sqlx::query_as::<_, SalesTotals>(
        "SELECT COALESCE(SUM(total), 0) AS total, COUNT(*) AS count
         FROM sales
         WHERE store_id = ?1 AND status = 'completed'
           AND created_at >= ?2 AND created_at < ?3",
    )
    .bind(store_id)
    .bind(start)
    .bind(end)
    .fetch_one(&mut *conn)
    .await?;

    Ok(totals)
}

/// Income and expense entries booked on `from..=to`.
async fn flow_totals(
    conn: &mut SqliteConnection,
    store_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> DbResult<FlowTotals> {
    let totals = sqlx::query_as::<_, FlowTotals>(
        "SELECT COALESCE(SUM(CASE WHEN flow_type = 'income' THEN amount END), 0) AS income,
                COALESCE(SUM(CASE WHEN flow_type = 'expense' THEN amount END), 0) AS expense
         FROM cash_flow_entries
         WHERE store_id = ?1 AND entry_date >= ?2 AND entry_date <= ?3",
    )
    .bind(store_id)
    .bind(from)
    .bind(to)
    .fetch_one(&mut *conn)
    .await?;

    Ok(totals)
}
