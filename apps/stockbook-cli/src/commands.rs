//! Command handlers. Each returns the JSON document printed on stdout.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use stockbook_core::{QuotaResource, SaleRequest, StockAdjustment};
use stockbook_db::{retry_on_busy, Database};
use tracing::info;

use crate::cli::{AdjustArgs, Command, SellArgs};
use crate::config::AppConfig;
use crate::seed;

pub async fn run(db: &Database, config: &AppConfig, command: Command) -> Result<Value> {
    match command {
        Command::Migrate => {
            db.run_migrations().await?;
            Ok(json!({ "migrated": true }))
        }

        Command::Seed { owner, products } => {
            let summary = seed::run(db, &owner, products).await?;
            to_json(&summary)
        }

        Command::Sell(args) => sell(db, config, args).await,

        Command::Adjust(args) => adjust(db, config, args).await,

        Command::DailyStats { store, date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            to_json(&db.reports().daily_stats(&store, date).await?)
        }

        Command::LowStock { store } => to_json(&db.reports().low_stock(&store).await?),

        Command::Receivables { store } => {
            to_json(&db.reports().accounts_receivable(&store).await?)
        }

        Command::Reconcile { store } => {
            let report = db.inventory().reconcile(&store).await?;
            let unbalanced = report.iter().filter(|r| !r.balanced).count();
            Ok(json!({
                "balanced": unbalanced == 0,
                "unbalanced": unbalanced,
                "products": report,
            }))
        }

        Command::Quota { owner, resource } => {
            let quota = db.quota();
            let decision = match QuotaResource::from(resource) {
                QuotaResource::Store => quota.can_create_store(&owner).await?,
                QuotaResource::User => quota.can_create_user(&owner).await?,
            };
            to_json(&decision)
        }
    }
}

/// Sells, retrying while the ledger is busy.
async fn sell(db: &Database, config: &AppConfig, args: SellArgs) -> Result<Value> {
    let request = SaleRequest {
        store_id: args.store,
        cashier_id: args.cashier,
        items: args.items,
        discount: args.discount,
        tax: args.tax,
        payment_method: args.payment.into(),
        customer_id: args.customer,
        notes: args.notes,
    };

    let processor = db.processor();
    let completed = retry_on_busy(&config.retry, || processor.process_sale(request.clone())).await?;

    info!(receipt = %completed.sale.receipt_number, total = %completed.sale.total, "Sale recorded");
    to_json(&completed)
}

async fn adjust(db: &Database, config: &AppConfig, args: AdjustArgs) -> Result<Value> {
    let adjustment = StockAdjustment {
        store_id: args.store,
        product_id: args.product,
        quantity: args.quantity,
        reason: args.reason.into(),
        note: args.note,
        actor_id: args.actor,
    };

    let inventory = db.inventory();
    let adjusted = retry_on_busy(&config.retry, || inventory.adjust_stock(&adjustment)).await?;
    to_json(&adjusted)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
