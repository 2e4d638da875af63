//! Command line definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use stockbook_core::{
    LineItemRequest, Money, MovementReason, PaymentMethod, Quantity, QuotaResource,
};

/// Retail back-office ledger: sales, stock, cash flow and plan quotas.
#[derive(Parser, Debug)]
#[command(name = "stockbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: stockbook.toml in the platform config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ledger database file, overriding config and environment
    #[arg(short, long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply pending schema migrations
    Migrate,

    /// Create a demo plan, store, customer and catalogue
    Seed {
        /// Owner to subscribe and open the store for
        #[arg(long, default_value = "demo-owner")]
        owner: String,

        /// Number of products to generate
        #[arg(long, default_value_t = 40)]
        products: usize,
    },

    /// Record a sale
    Sell(SellArgs),

    /// Book a manual stock movement
    Adjust(AdjustArgs),

    /// Sales and cash flow for one day
    DailyStats {
        #[arg(long)]
        store: String,

        /// Business day (YYYY-MM-DD, UTC); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Active products at or below their reorder level
    LowStock {
        #[arg(long)]
        store: String,
    },

    /// Unpaid income grouped by customer
    Receivables {
        #[arg(long)]
        store: String,
    },

    /// Compare stock with the movement ledger
    Reconcile {
        #[arg(long)]
        store: String,
    },

    /// Check whether an owner may create another store or user
    Quota {
        #[arg(long)]
        owner: String,

        #[arg(long, value_enum, default_value_t = ResourceArg::Store)]
        resource: ResourceArg,
    },
}

#[derive(Args, Debug)]
pub struct SellArgs {
    #[arg(long)]
    pub store: String,

    #[arg(long)]
    pub cashier: String,

    /// Sale line as PRODUCT_ID:QUANTITY:UNIT_PRICE (repeatable)
    #[arg(long = "item", required = true, value_parser = parse_line)]
    pub items: Vec<LineItemRequest>,

    #[arg(long, default_value = "0")]
    pub discount: Money,

    #[arg(long, default_value = "0")]
    pub tax: Money,

    #[arg(long, value_enum, default_value_t = PaymentArg::Cash)]
    pub payment: PaymentArg,

    #[arg(long)]
    pub customer: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct AdjustArgs {
    #[arg(long)]
    pub store: String,

    #[arg(long)]
    pub product: String,

    /// Signed change, e.g. 12 or -3.5
    #[arg(long, allow_hyphen_values = true)]
    pub quantity: Quantity,

    #[arg(long, value_enum)]
    pub reason: ReasonArg,

    #[arg(long)]
    pub note: Option<String>,

    /// Who is booking the movement
    #[arg(long)]
    pub actor: String,
}

// =============================================================================
// Value Enums
// =============================================================================

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentArg {
    Cash,
    Card,
    Transfer,
    EWallet,
}

impl From<PaymentArg> for PaymentMethod {
    fn from(arg: PaymentArg) -> Self {
        match arg {
            PaymentArg::Cash => PaymentMethod::Cash,
            PaymentArg::Card => PaymentMethod::Card,
            PaymentArg::Transfer => PaymentMethod::Transfer,
            PaymentArg::EWallet => PaymentMethod::EWallet,
        }
    }
}

/// Reasons an operator may book. Sales are booked by `sell` only.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReasonArg {
    Restock,
    Adjustment,
    Return,
    Damage,
}

impl From<ReasonArg> for MovementReason {
    fn from(arg: ReasonArg) -> Self {
        match arg {
            ReasonArg::Restock => MovementReason::Restock,
            ReasonArg::Adjustment => MovementReason::Adjustment,
            ReasonArg::Return => MovementReason::Return,
            ReasonArg::Damage => MovementReason::Damage,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceArg {
    Store,
    User,
}

impl From<ResourceArg> for QuotaResource {
    fn from(arg: ResourceArg) -> Self {
        match arg {
            ResourceArg::Store => QuotaResource::Store,
            ResourceArg::User => QuotaResource::User,
        }
    }
}

/// Parses `PRODUCT_ID:QUANTITY:UNIT_PRICE`.
///
/// The product id may itself contain colons; the last two fields are split
/// off from the right.
fn parse_line(raw: &str) -> Result<LineItemRequest, String> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(price), Some(quantity), Some(product_id)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected PRODUCT_ID:QUANTITY:UNIT_PRICE, got '{raw}'"));
    };

    if product_id.trim().is_empty() {
        return Err("product id is empty".to_string());
    }

    Ok(LineItemRequest {
        product_id: product_id.trim().to_string(),
        quantity: quantity.parse().map_err(|e| format!("quantity: {e}"))?,
        unit_price: price.parse().map_err(|e| format!("unit price: {e}"))?,
    })
}
