//! # Aggregate Types
//!
//! Report shapes and the arithmetic that assembles them from raw sums.
//!
//! The database layer runs the `SUM`/`COUNT` queries inside one read
//! transaction; everything derived from those figures (income, net flow,
//! averages, grouping, reconciliation) is computed here so it can be tested
//! without a database.
//!
//! ## Daily Cash Flow
//! ```text
//!   total_sales     Σ sale.total      created_at in [date 00:00, date+1 00:00) UTC
//! + income entries  Σ amount          entry_date == date, flow_type = income
//! ─────────────────
//! = total_income
//! − total_expenses  Σ amount          entry_date == date, flow_type = expense
//! ─────────────────
//! = net_flow
//! ```

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::CashFlowEntry;

/// The half-open UTC window `[date 00:00, date+1 00:00)`.
///
/// The last representable day has no end bound and is rejected.
pub fn utc_day_bounds(date: NaiveDate) -> CoreResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::default()));
    let end = start
        .checked_add_signed(Duration::days(1))
        .ok_or_else(|| CoreError::invalid("date", format!("{date} is out of range")))?;
    Ok((start, end))
}

fn add(figure: &'static str, a: Money, b: Money) -> CoreResult<Money> {
    a.checked_add(b).ok_or(CoreError::Overflow { figure })
}

fn sub(figure: &'static str, a: Money, b: Money) -> CoreResult<Money> {
    a.checked_sub(b).ok_or(CoreError::Overflow { figure })
}

// =============================================================================
// Daily Stats
// =============================================================================

/// Dashboard figures for one business day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_sales: Money,
    pub sales_count: i64,
    pub total_income: Money,
    pub total_expenses: Money,
    pub net_flow: Money,
}

impl DailyStats {
    /// Assembles the day from its raw sums.
    ///
    /// Fails with [`CoreError::Overflow`] when income or net flow leave the
    /// money range.
    pub fn compose(
        date: NaiveDate,
        totals: &SalesTotals,
        other_income: Money,
        total_expenses: Money,
    ) -> CoreResult<Self> {
        let total_income = add("total_income", totals.total, other_income)?;
        Ok(DailyStats {
            date,
            total_sales: totals.total,
            sales_count: totals.count,
            total_income,
            total_expenses,
            net_flow: sub("net_flow", total_income, total_expenses)?,
        })
    }
}

/// `SUM(total)` and `COUNT(*)` over a set of sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesTotals {
    pub total: Money,
    pub count: i64,
}

/// Income and expense sums over a set of cash-flow entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FlowTotals {
    pub income: Money,
    pub expense: Money,
}

// =============================================================================
// Period Summary
// =============================================================================

/// Totals across an inclusive range of days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
    pub days: i64,
    pub total_sales: Money,
    pub sales_count: i64,
    /// Mean sale total, rounded half to even; zero when there are no sales.
    pub average_sale: Money,
    pub total_income: Money,
    pub total_expenses: Money,
    pub net_flow: Money,
}

impl PeriodSummary {
    pub fn compose(
        from: NaiveDate,
        to: NaiveDate,
        sales: &SalesTotals,
        flows: &FlowTotals,
    ) -> CoreResult<Self> {
        let total_income = add("total_income", sales.total, flows.income)?;
        Ok(PeriodSummary {
            from,
            to,
            days: (to - from).num_days() + 1,
            total_sales: sales.total,
            sales_count: sales.count,
            average_sale: average(sales.total, sales.count),
            total_income,
            total_expenses: flows.expense,
            net_flow: sub("net_flow", total_income, flows.expense)?,
        })
    }
}

fn average(total: Money, count: i64) -> Money {
    if count <= 0 {
        return Money::zero();
    }

    let mean = (total.to_decimal() / Decimal::from(count))
        .round_dp_with_strategy(Money::SCALE, RoundingStrategy::MidpointNearestEven);
    Money::from_decimal(mean).unwrap_or_default()
}

// =============================================================================
// Top Products
// =============================================================================

/// A product ranked by quantity sold over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub quantity_sold: Quantity,
    pub revenue: Money,
    /// Number of sale lines the product appeared on.
    pub line_count: i64,
}

// =============================================================================
// Accounts Receivable
// =============================================================================

/// Everything one customer still owes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Receivable {
    pub customer_id: String,
    pub customer_name: String,
    pub total_unpaid: Money,
    pub entries: Vec<CashFlowEntry>,
}

/// Groups unpaid income entries by customer.
///
/// Entries without a customer are skipped. The result is ordered by
/// `total_unpaid` descending, then by customer name; entries inside a group
/// keep their input order.
pub fn group_receivables(
    rows: impl IntoIterator<Item = (CashFlowEntry, String)>,
) -> CoreResult<Vec<Receivable>> {
    let mut groups: Vec<Receivable> = Vec::new();

    for (entry, customer_name) in rows {
        let Some(customer_id) = entry.customer_id.clone() else {
            continue;
        };

        match groups.iter_mut().find(|g| g.customer_id == customer_id) {
            Some(group) => {
                group.total_unpaid = add("total_unpaid", group.total_unpaid, entry.amount)?;
                group.entries.push(entry);
            }
            None => groups.push(Receivable {
                customer_id,
                customer_name,
                total_unpaid: entry.amount,
                entries: vec![entry],
            }),
        }
    }

    groups.sort_by(|a, b| {
        b.total_unpaid
            .cmp(&a.total_unpaid)
            .then_with(|| a.customer_name.cmp(&b.customer_name))
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    Ok(groups)
}

// =============================================================================
// Stock Reconciliation
// =============================================================================

/// Whether a product's stock agrees with its movement ledger.
///
/// `expected = initial_stock + Σ(+q for in, −q for out)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockReconciliation {
    pub product_id: String,
    pub sku: String,
    pub stock: Quantity,
    pub initial_stock: Quantity,
    /// Signed sum of all movements.
    pub movement_total: Quantity,
    pub expected: Quantity,
    pub balanced: bool,
}

impl StockReconciliation {
    pub fn new(
        product_id: String,
        sku: String,
        stock: Quantity,
        initial_stock: Quantity,
        movement_total: Quantity,
    ) -> Self {
        let expected = initial_stock.saturating_add(movement_total);
        StockReconciliation {
            product_id,
            sku,
            stock,
            initial_stock,
            movement_total,
            expected,
            balanced: expected == stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlowType, PaymentStatus};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn entry(id: &str, customer: Option<&str>, cents: i64) -> CashFlowEntry {
        CashFlowEntry {
            id: id.to_string(),
            store_id: "store-1".to_string(),
            flow_type: FlowType::Income,
            amount: Money::from_cents(cents),
            payment_status: PaymentStatus::Unpaid,
            category: "credit sale".to_string(),
            description: None,
            customer_id: customer.map(str::to_string),
            product_id: None,
            entry_date: date(),
            created_by: "user-1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_utc_day_bounds() {
        let (start, end) = utc_day_bounds(date()).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-10-14T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-10-15T00:00:00+00:00");
    }

    #[test]
    fn test_last_representable_day_is_invalid() {
        let err = utc_day_bounds(NaiveDate::MAX).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidRequest);
        assert!(utc_day_bounds(NaiveDate::MIN).is_ok());
    }

    #[test]
    fn test_daily_stats_compose() {
        let totals = SalesTotals {
            total: Money::from_cents(10_000),
            count: 4,
        };
        let stats = DailyStats::compose(
            date(),
            &totals,
            Money::from_cents(2_500),
            Money::from_cents(4_000),
        )
        .unwrap();

        assert_eq!(stats.total_sales.cents(), 10_000);
        assert_eq!(stats.sales_count, 4);
        assert_eq!(stats.total_income.cents(), 12_500);
        assert_eq!(stats.net_flow.cents(), 8_500);
    }

    #[test]
    fn test_net_flow_can_be_negative() {
        let stats = DailyStats::compose(
            date(),
            &SalesTotals::default(),
            Money::zero(),
            Money::from_cents(700),
        )
        .unwrap();
        assert_eq!(stats.net_flow.cents(), -700);
    }

    #[test]
    fn test_figures_beyond_money_range_are_errors() {
        let half = Money::from_cents(5_000_000_000_000_000_000);
        let totals = SalesTotals { total: half, count: 1 };

        let err = DailyStats::compose(date(), &totals, half, Money::zero()).unwrap_err();
        assert!(matches!(err, CoreError::Overflow { figure: "total_income" }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);

        let err = DailyStats::compose(
            date(),
            &SalesTotals::default(),
            Money::from_cents(-5_000_000_000_000_000_000),
            half,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Overflow { figure: "net_flow" }));

        let flows = FlowTotals { income: half, expense: Money::zero() };
        assert!(PeriodSummary::compose(date(), date(), &totals, &flows).is_err());

        // Each figure alone still composes.
        let stats = DailyStats::compose(date(), &totals, Money::zero(), half).unwrap();
        assert!(stats.net_flow.is_zero());

        let rows = vec![
            (entry("e1", Some("c-ana"), 5_000_000_000_000_000_000), "Ana".to_string()),
            (entry("e2", Some("c-ana"), 5_000_000_000_000_000_000), "Ana".to_string()),
        ];
        assert!(matches!(
            group_receivables(rows),
            Err(CoreError::Overflow { figure: "total_unpaid" })
        ));
    }

    #[test]
    fn test_period_summary_average() {
        let from = date();
        let to = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let summary = PeriodSummary::compose(
            from,
            to,
            &SalesTotals {
                total: Money::from_cents(1_000),
                count: 3,
            },
            &FlowTotals::default(),
        )
        .unwrap();

        assert_eq!(summary.days, 7);
        // 10.00 / 3 = 3.333… → 3.33
        assert_eq!(summary.average_sale.cents(), 333);

        let empty =
            PeriodSummary::compose(from, from, &SalesTotals::default(), &FlowTotals::default())
                .unwrap();
        assert_eq!(empty.days, 1);
        assert!(empty.average_sale.is_zero());
    }

    #[test]
    fn test_group_receivables_orders_by_total_then_name() {
        let rows = vec![
            (entry("e1", Some("c-budi"), 500), "Budi".to_string()),
            (entry("e2", Some("c-ana"), 300), "Ana".to_string()),
            (entry("e3", Some("c-budi"), 250), "Budi".to_string()),
            (entry("e4", Some("c-citra"), 750), "Citra".to_string()),
            (entry("e5", None, 9_999), String::new()),
            (entry("e6", Some("c-ana"), 450), "Ana".to_string()),
        ];

        let groups = group_receivables(rows).unwrap();
        let summary: Vec<(&str, i64, usize)> = groups
            .iter()
            .map(|g| (g.customer_name.as_str(), g.total_unpaid.cents(), g.entries.len()))
            .collect();

        assert_eq!(
            summary,
            vec![("Ana", 750, 2), ("Budi", 750, 2), ("Citra", 750, 1)]
        );
        assert_eq!(groups[0].entries[0].id, "e2");
    }

    #[test]
    fn test_reconciliation() {
        let ok = StockReconciliation::new(
            "p1".to_string(),
            "SKU".to_string(),
            Quantity::from_units(2),
            Quantity::from_units(5),
            Quantity::from_units(-3),
        );
        assert!(ok.balanced);
        assert_eq!(ok.expected, Quantity::from_units(2));

        let drifted = StockReconciliation::new(
            "p1".to_string(),
            "SKU".to_string(),
            Quantity::from_units(4),
            Quantity::from_units(5),
            Quantity::from_units(-3),
        );
        assert!(!drifted.balanced);
    }
}
