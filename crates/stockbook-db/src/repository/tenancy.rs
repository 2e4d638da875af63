//! # Tenancy Repository
//!
//! Stores and the users who work in them.
//!
//! ## Tenant Model
//! ```text
//! owner_id (opaque, from the auth layer)
//!   └── Store (is_active)
//!         ├── User (role: owner / manager / cashier)
//!         └── products, sales, movements, customers, cash flow ...
//! ```
//!
//! Creation goes through [`QuotaGate`](crate::quota::QuotaGate) so the plan
//! limit is checked in the same transaction as the insert. This repository
//! holds the reads, the deactivations and the insert helpers the gate uses.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use stockbook_core::{Store, User};

use crate::error::{DbResult, LedgerError, LedgerResult};

/// Repository for store and user records.
#[derive(Debug, Clone)]
pub struct TenancyRepository {
    pool: SqlitePool,
}

impl TenancyRepository {
    /// Creates a new TenancyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TenancyRepository { pool }
    }

    pub async fn get_store(&self, id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(concat!(
            "SELECT ",
            store_columns!(),
            " FROM stores WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Lists an owner's stores, active and inactive, oldest first.
    pub async fn list_stores(&self, owner_id: &str) -> DbResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(concat!(
            "SELECT ",
            store_columns!(),
            " FROM stores WHERE owner_id = ?1 ORDER BY created_at, id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    /// Deactivates a store. Its ledger stays readable; new sales are refused.
    ///
    /// A deactivated store no longer counts toward the owner's quota.
    pub async fn deactivate_store(&self, id: &str) -> LedgerResult<Store> {
        let store = sqlx::query_as::<_, Store>(concat!(
            "UPDATE stores SET is_active = 0, updated_at = ?2
             WHERE id = ?1
             RETURNING ",
            store_columns!()
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let store = store.ok_or_else(|| LedgerError::not_found("Store", id))?;
        info!(id = %id, "Store deactivated");
        Ok(store)
    }

    pub async fn get_user(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists a store's users, active and inactive, by name.
    pub async fn list_users(&self, store_id: &str) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE store_id = ?1 ORDER BY name, id"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn deactivate_user(&self, id: &str) -> LedgerResult<User> {
        let user = sqlx::query_as::<_, User>(concat!(
            "UPDATE users SET is_active = 0 WHERE id = ?1 RETURNING ",
            user_columns!()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let user = user.ok_or_else(|| LedgerError::not_found("User", id))?;
        info!(id = %id, "User deactivated");
        Ok(user)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Takes the writer lock through the store row.
///
/// Returns `false` when the store is missing or inactive.
pub(crate) async fn lock_active_store(conn: &mut SqliteConnection, store_id: &str) -> DbResult<bool> {
    Ok(active_store_owner(conn, store_id).await?.is_some())
}

/// Locks an active store and returns its owner.
pub(crate) async fn active_store_owner(
    conn: &mut SqliteConnection,
    store_id: &str,
) -> DbResult<Option<String>> {
    let owner: Option<String> = sqlx::query_scalar(
        "UPDATE stores SET updated_at = updated_at
         WHERE id = ?1 AND is_active = 1
         RETURNING owner_id",
    )
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(owner)
}

pub(crate) async fn insert_store(conn: &mut SqliteConnection, store: &Store) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO stores (id, owner_id, name, address, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&store.id)
    .bind(&store.owner_id)
    .bind(&store.name)
    .bind(&store.address)
    .bind(store.is_active)
    .bind(store.created_at)
    .bind(store.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn insert_user(conn: &mut SqliteConnection, user: &User) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO users (id, store_id, name, email, role, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&user.id)
    .bind(&user.store_id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.role)
    .bind(user.is_active)
    .bind(user.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Active stores owned by `owner_id`.
pub(crate) async fn count_active_stores(conn: &mut SqliteConnection, owner_id: &str) -> DbResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM stores WHERE owner_id = ?1 AND is_active = 1")
            .bind(owner_id)
            .fetch_one(&mut *conn)
            .await?;

    Ok(count)
}

/// Active users across the owner's active stores.
pub(crate) async fn count_active_users(conn: &mut SqliteConnection, owner_id: &str) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)
         FROM users u
         JOIN stores s ON s.id = u.store_id
         WHERE s.owner_id = ?1 AND s.is_active = 1 AND u.is_active = 1",
    )
    .bind(owner_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}
