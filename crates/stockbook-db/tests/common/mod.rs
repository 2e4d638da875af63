//! Shared fixtures for the ledger integration tests.

#![allow(dead_code)]

use std::time::Duration;

use stockbook_core::{
    Money, NewPlan, NewProduct, NewStore, Product, Quantity, SaleRequest, Store, SubscriptionStatus,
};
use stockbook_db::{Database, DbConfig};
use tempfile::TempDir;

pub const OWNER: &str = "owner-1";
pub const CASHIER: &str = "cashier-1";

pub fn money(s: &str) -> Money {
    s.parse().unwrap()
}

pub fn units(n: i64) -> Quantity {
    Quantity::from_units(n)
}

/// A migrated single-connection in-memory database.
pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// A file database in a fresh temp dir, for multi-connection scenarios.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn file_db(max_connections: u32, lock_timeout: Duration) -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("ledger.db"))
        .max_connections(max_connections)
        .lock_timeout(lock_timeout);
    let db = Database::new(config).await.unwrap();
    (db, dir)
}

/// Creates a plan and an active subscription for `owner_id`.
pub async fn subscribe(db: &Database, owner_id: &str, plan_name: &str, max_stores: i64, max_users: i64) {
    let subscriptions = db.subscriptions();
    let plan = subscriptions
        .create_plan(&NewPlan {
            name: plan_name.to_string(),
            max_stores,
            max_users,
            price: money("99.00"),
        })
        .await
        .unwrap();

    subscriptions
        .subscribe(owner_id, &plan.id, SubscriptionStatus::Active, None)
        .await
        .unwrap();
}

pub async fn open_store(db: &Database, owner_id: &str, name: &str) -> Store {
    db.quota()
        .create_store(&NewStore {
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            address: None,
        })
        .await
        .unwrap()
}

/// Subscribes OWNER to a roomy plan and opens one store.
pub async fn store_fixture(db: &Database) -> Store {
    subscribe(db, OWNER, "Fixture", 10, 50).await;
    open_store(db, OWNER, "Main Street").await
}

pub async fn add_product(db: &Database, store_id: &str, sku: &str, price: &str, stock: i64) -> Product {
    add_product_with_min(db, store_id, sku, price, stock, 0).await
}

pub async fn add_product_with_min(
    db: &Database,
    store_id: &str,
    sku: &str,
    price: &str,
    stock: i64,
    min_stock: i64,
) -> Product {
    db.products()
        .create(&NewProduct {
            store_id: store_id.to_string(),
            sku: sku.to_string(),
            barcode: None,
            name: format!("Product {sku}"),
            description: None,
            selling_price: money(price),
            purchase_price: Money::zero(),
            initial_stock: units(stock),
            min_stock_level: units(min_stock),
        })
        .await
        .unwrap()
}

pub fn sale(store_id: &str) -> SaleRequest {
    SaleRequest::new(store_id, CASHIER)
}

pub async fn count(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .unwrap()
}

pub async fn stock_of(db: &Database, store_id: &str, product_id: &str) -> Quantity {
    db.products()
        .get(store_id, product_id)
        .await
        .unwrap()
        .unwrap()
        .stock
}
