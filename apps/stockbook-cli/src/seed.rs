//! # Demo Data
//!
//! `stockbook seed` gives a fresh ledger something to look at: a plan, a
//! subscribed owner, one store, a credit customer with an open balance and a
//! generated catalogue.
//!
//! ## Generated Products
//! - SKU `{CATEGORY}-{INDEX:03}`, barcode `590{INDEX:010}`
//! - Price 1.99 to 9.98, purchase price 60% of that
//! - Stock 10 to 99, reorder level 5
//!
//! Seeding an owner that already has a store changes nothing.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use stockbook_core::{
    FlowType, Money, NewCashFlowEntry, NewCustomer, NewPlan, NewProduct, NewStore, PaymentStatus,
    Quantity, SubscriptionStatus,
};
use stockbook_db::Database;
use tracing::info;

const DEMO_PLAN: &str = "Demo";

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &["Cola 330ml", "Orange Soda", "Mineral Water 1.5L", "Mango Juice", "Iced Tea", "Energy Drink"],
    ),
    (
        "SNK",
        &["Salted Crisps", "Masala Crisps", "Chocolate Bar", "Butter Biscuits", "Peanuts 200g"],
    ),
    (
        "DRY",
        &["Basmati Rice 5kg", "Red Lentils 1kg", "Sugar 1kg", "Wheat Flour 10kg", "Black Tea 450g"],
    ),
    (
        "HOU",
        &["Dish Soap", "Laundry Powder 1kg", "Bath Soap", "Toothpaste", "Matches 10-pack"],
    ),
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub owner_id: String,
    pub store_id: String,
    pub customer_id: Option<String>,
    pub product_ids: Vec<String>,
    /// True when the owner already had a store and nothing was written.
    pub skipped: bool,
}

pub async fn run(db: &Database, owner_id: &str, product_count: usize) -> Result<SeedSummary> {
    let tenancy = db.tenancy();

    if let Some(store) = tenancy.list_stores(owner_id).await?.into_iter().next() {
        info!(owner_id = %owner_id, store_id = %store.id, "Owner already seeded, skipping");
        let product_ids = db
            .products()
            .list(&store.id, true)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        return Ok(SeedSummary {
            owner_id: owner_id.to_string(),
            store_id: store.id,
            customer_id: None,
            product_ids,
            skipped: true,
        });
    }

    ensure_subscription(db, owner_id).await?;

    let store = db
        .quota()
        .create_store(&NewStore {
            owner_id: owner_id.to_string(),
            name: "Demo Store".to_string(),
            address: Some("1 Market Road".to_string()),
        })
        .await?;

    let customer = db
        .customers()
        .create(&NewCustomer {
            store_id: store.id.clone(),
            name: "Credit Customer".to_string(),
            phone: None,
            email: None,
        })
        .await?;

    db.cash_flow()
        .record(&NewCashFlowEntry {
            store_id: store.id.clone(),
            flow_type: FlowType::Income,
            amount: Money::from_cents(2_500),
            payment_status: PaymentStatus::Unpaid,
            category: "credit sale".to_string(),
            description: Some("Opening balance".to_string()),
            customer_id: Some(customer.id.clone()),
            product_id: None,
            entry_date: Utc::now().date_naive(),
            created_by: owner_id.to_string(),
        })
        .await?;

    let products = db.products();
    let mut product_ids = Vec::with_capacity(product_count);
    for (index, (category, name)) in catalogue().take(product_count).enumerate() {
        let product = products.create(&generate_product(&store.id, category, name, index)).await?;
        product_ids.push(product.id);
    }

    info!(
        owner_id = %owner_id,
        store_id = %store.id,
        products = product_ids.len(),
        "Seed complete"
    );

    Ok(SeedSummary {
        owner_id: owner_id.to_string(),
        store_id: store.id,
        customer_id: Some(customer.id),
        product_ids,
        skipped: false,
    })
}

async fn ensure_subscription(db: &Database, owner_id: &str) -> Result<()> {
    let subscriptions = db.subscriptions();

    if subscriptions.current_for_owner(owner_id).await?.is_some() {
        return Ok(());
    }

    let plan = match subscriptions.get_plan_by_name(DEMO_PLAN).await? {
        Some(plan) => plan,
        None => {
            subscriptions
                .create_plan(&NewPlan {
                    name: DEMO_PLAN.to_string(),
                    max_stores: 3,
                    max_users: 10,
                    price: Money::zero(),
                })
                .await?
        }
    };

    subscriptions
        .subscribe(owner_id, &plan.id, SubscriptionStatus::Active, None)
        .await?;
    Ok(())
}

/// Category/name pairs, cycling with a numbered suffix once exhausted.
fn catalogue() -> impl Iterator<Item = (&'static str, String)> {
    let base: Vec<(&'static str, &'static str)> = CATEGORIES
        .iter()
        .flat_map(|(code, names)| names.iter().map(move |name| (*code, *name)))
        .collect();
    let size = base.len();

    (0..).map(move |i| {
        let (code, name) = base[i % size];
        if i < size {
            (code, name.to_string())
        } else {
            (code, format!("{name} #{}", i / size + 1))
        }
    })
}

fn generate_product(store_id: &str, category: &str, name: String, index: usize) -> NewProduct {
    let seed = index as i64;
    let price = 199 + (seed * 17) % 800;

    NewProduct {
        store_id: store_id.to_string(),
        sku: format!("{category}-{index:03}"),
        barcode: Some(format!("590{index:010}")),
        name,
        description: None,
        selling_price: Money::from_cents(price),
        purchase_price: Money::from_cents(price * 6 / 10),
        initial_stock: Quantity::from_units(10 + (seed * 7) % 90),
        min_stock_level: Quantity::from_units(5),
    }
}
