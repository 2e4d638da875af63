//! Store customers, referenced by credit sales and receivables.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use stockbook_core::{new_id, Customer, NewCustomer};

use crate::error::{DbError, DbResult, LedgerError, LedgerResult};

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a customer in an existing store.
    ///
    /// ## Returns
    /// * `NotFound` - The store does not exist
    pub async fn create(&self, input: &NewCustomer) -> LedgerResult<Customer> {
        input.validate()?;

        let customer = Customer {
            id: new_id(),
            store_id: input.store_id.clone(),
            name: input.name.trim().to_string(),
            phone: input.phone.clone(),
            email: input.email.as_deref().map(|e| e.trim().to_string()),
            created_at: Utc::now(),
        };

        debug!(store_id = %customer.store_id, name = %customer.name, "Creating customer");

        sqlx::query(
            "INSERT INTO customers (id, store_id, name, phone, email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&customer.id)
        .bind(&customer.store_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)
        .map_err(|err| match err {
            DbError::ForeignKeyViolation { .. } => LedgerError::not_found("Store", &customer.store_id),
            other => LedgerError::Db(other),
        })?;

        Ok(customer)
    }

    pub async fn get(&self, store_id: &str, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(concat!(
            "SELECT ",
            customer_columns!(),
            " FROM customers WHERE id = ?1 AND store_id = ?2"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists a store's customers by name.
    pub async fn list(&self, store_id: &str) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(concat!(
            "SELECT ",
            customer_columns!(),
            " FROM customers WHERE store_id = ?1 ORDER BY name, id"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}

/// Whether `id` names a customer of `store_id`, inside the caller's transaction.
pub(crate) async fn exists_in_store(conn: &mut SqliteConnection, store_id: &str, id: &str) -> DbResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM customers WHERE id = ?1 AND store_id = ?2")
            .bind(id)
            .bind(store_id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(found.is_some())
}
