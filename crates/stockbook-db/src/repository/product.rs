//! # Product Repository
//!
//! Database operations for the product catalogue.
//!
//! ## Key Operations
//! - Catalogue CRUD (never stock: stock only moves through the processor
//!   and the inventory service)
//! - Search by name, SKU or barcode
//! - Transaction helpers: locking read and guarded stock delta
//!
//! ## Locking Read
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite has no SELECT ... FOR UPDATE. The equivalent is a no-op write   │
//! │  that returns the row:                                                  │
//! │                                                                         │
//! │    UPDATE products SET updated_at = updated_at                          │
//! │    WHERE id = ?1 AND store_id = ?2                                      │
//! │    RETURNING ...                                                        │
//! │                                                                         │
//! │  The write takes the database writer lock (or waits for it up to       │
//! │  busy_timeout), so the stock value returned is the latest committed     │
//! │  one and stays valid until this transaction ends.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use stockbook_core::{
    new_id, NewProduct, Product, ProductUpdate, Quantity, ValidationError,
};

use crate::error::{DbError, DbResult, LedgerError, LedgerResult};
use crate::repository::{like_pattern, tenancy};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let results = repo.search(store_id, "coke", 20).await?;
/// let product = repo.get(store_id, "uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product with `stock = initial_stock`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `InvalidRequest` - Validation failed, or SKU/barcode already used in
    ///   this store
    /// * `NotFound` - Store is missing or inactive
    pub async fn create(&self, input: &NewProduct) -> LedgerResult<Product> {
        input.validate()?;

        let now = Utc::now();
        let product = Product {
            id: new_id(),
            store_id: input.store_id.clone(),
            sku: input.sku.trim().to_string(),
            barcode: input.barcode.as_deref().map(|b| b.trim().to_string()),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            selling_price: input.selling_price,
            purchase_price: input.purchase_price,
            stock: input.initial_stock,
            initial_stock: input.initial_stock,
            min_stock_level: input.min_stock_level,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(store_id = %product.store_id, sku = %product.sku, "Creating product");

        let mut tx = self.pool.begin().await?;

        if !tenancy::lock_active_store(&mut tx, &product.store_id).await? {
            return Err(LedgerError::not_found("Store", &product.store_id));
        }

        insert(&mut tx, &product)
            .await
            .map_err(|err| duplicate_to_invalid(err, &product))?;

        tx.commit().await?;

        info!(id = %product.id, sku = %product.sku, stock = %product.stock, "Product created");
        Ok(product)
    }

    /// Gets a product by its ID within a store.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found, or it belongs to another store
    pub async fn get(&self, store_id: &str, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE id = ?1 AND store_id = ?2"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU (e.g., "COKE-330").
    pub async fn get_by_sku(&self, store_id: &str, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE sku = ?1 AND store_id = ?2"
        ))
        .bind(sku.trim())
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by barcode (scanner input).
    pub async fn get_by_barcode(&self, store_id: &str, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE barcode = ?1 AND store_id = ?2"
        ))
        .bind(barcode.trim())
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches active products by name, SKU or barcode substring.
    ///
    /// ## Arguments
    /// * `query` - Search term (can be partial, case-insensitive for ASCII)
    /// * `limit` - Maximum results to return
    ///
    /// An empty query lists active products by name.
    pub async fn search(&self, store_id: &str, query: &str, limit: u32) -> LedgerResult<Vec<Product>> {
        let query = stockbook_core::validation::validate_search_query(query)?;

        debug!(store_id = %store_id, query = %query, limit = %limit, "Searching products");

        let products = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products
              WHERE store_id = ?1
                AND is_active = 1
                AND (name LIKE ?2 ESCAPE '\\'
                     OR sku LIKE ?2 ESCAPE '\\'
                     OR barcode LIKE ?2 ESCAPE '\\')
              ORDER BY name, sku
              LIMIT ?3"
        ))
        .bind(store_id)
        .bind(like_pattern(&query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists a store's products ordered by name.
    pub async fn list(&self, store_id: &str, include_inactive: bool) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products
              WHERE store_id = ?1 AND (is_active = 1 OR ?2)
              ORDER BY name, sku"
        ))
        .bind(store_id)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates catalogue details. Fields left `None` keep their value.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated product
    /// * `NotFound` - No such product in this store
    pub async fn update_details(
        &self,
        store_id: &str,
        id: &str,
        update: &ProductUpdate,
    ) -> LedgerResult<Product> {
        update.validate()?;

        debug!(id = %id, "Updating product details");

        let product = sqlx::query_as::<_, Product>(concat!(
            "UPDATE products SET
                name = COALESCE(?3, name),
                description = COALESCE(?4, description),
                barcode = COALESCE(?5, barcode),
                selling_price = COALESCE(?6, selling_price),
                purchase_price = COALESCE(?7, purchase_price),
                min_stock_level = COALESCE(?8, min_stock_level),
                updated_at = ?9
             WHERE id = ?1 AND store_id = ?2
             RETURNING ",
            product_columns!()
        ))
        .bind(id)
        .bind(store_id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.description.as_deref())
        .bind(update.barcode.as_deref().map(str::trim))
        .bind(update.selling_price)
        .bind(update.purchase_price)
        .bind(update.min_stock_level)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)
        .map_err(|err| match err {
            DbError::UniqueViolation { .. } => LedgerError::from(ValidationError::Duplicate {
                field: "barcode".to_string(),
                value: update.barcode.clone().unwrap_or_default(),
            }),
            other => LedgerError::Db(other),
        })?;

        product.ok_or_else(|| LedgerError::not_found("Product", id))
    }

    /// Soft-deletes (`active = false`) or restores a product.
    ///
    /// ## Why Soft Delete?
    /// Historical sale items and movements still reference the product.
    pub async fn set_active(&self, store_id: &str, id: &str, active: bool) -> LedgerResult<Product> {
        debug!(id = %id, active, "Setting product active flag");

        let product = sqlx::query_as::<_, Product>(concat!(
            "UPDATE products SET is_active = ?3, updated_at = ?4
             WHERE id = ?1 AND store_id = ?2
             RETURNING ",
            product_columns!()
        ))
        .bind(id)
        .bind(store_id)
        .bind(active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| LedgerError::not_found("Product", id))
    }

    /// Counts active products (for diagnostics).
    pub async fn count_active(&self, store_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE store_id = ?1 AND is_active = 1")
                .bind(store_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

fn duplicate_to_invalid(err: DbError, product: &Product) -> LedgerError {
    match err {
        DbError::UniqueViolation { field, .. } if field.contains("barcode") => {
            ValidationError::Duplicate {
                field: "barcode".to_string(),
                value: product.barcode.clone().unwrap_or_default(),
            }
            .into()
        }
        DbError::UniqueViolation { .. } => ValidationError::Duplicate {
            field: "sku".to_string(),
            value: product.sku.clone(),
        }
        .into(),
        other => LedgerError::Db(other),
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

pub(crate) async fn insert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO products (
            id, store_id, sku, barcode, name, description,
            selling_price, purchase_price, stock, initial_stock, min_stock_level,
            is_active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    )
    .bind(&product.id)
    .bind(&product.store_id)
    .bind(&product.sku)
    .bind(&product.barcode)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.selling_price)
    .bind(product.purchase_price)
    .bind(product.stock)
    .bind(product.initial_stock)
    .bind(product.min_stock_level)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Locking read of one product inside the caller's transaction.
///
/// ## Returns
/// * `Ok(Some(Product))` - Row locked, values are current
/// * `Ok(None)` - No such product in this store
pub(crate) async fn lock_for_update(
    conn: &mut SqliteConnection,
    store_id: &str,
    id: &str,
) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(concat!(
        "UPDATE products SET updated_at = updated_at
         WHERE id = ?1 AND store_id = ?2
         RETURNING ",
        product_columns!()
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

/// Applies a signed stock change, refusing to go below zero.
///
/// ## Delta Pattern
/// ```text
/// ✅ UPDATE products SET stock = stock + ?3 ... AND stock + ?3 >= 0
/// ❌ UPDATE products SET stock = 7
/// ```
/// A delta cannot overwrite a concurrent change, and the guard refuses
/// negative stock even if a caller skipped its own check.
///
/// ## Returns
/// * `Ok(Some(Product))` - The product after the change
/// * `Ok(None)` - Product missing, or the change would make stock negative
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    store_id: &str,
    id: &str,
    delta: Quantity,
    now: DateTime<Utc>,
) -> DbResult<Option<Product>> {
    debug!(id = %id, delta = %delta, "Applying stock delta");

    let product = sqlx::query_as::<_, Product>(concat!(
        "UPDATE products SET stock = stock + ?3, updated_at = ?4
         WHERE id = ?1 AND store_id = ?2 AND stock + ?3 >= 0
         RETURNING ",
        product_columns!()
    ))
    .bind(id)
    .bind(store_id)
    .bind(delta)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}
