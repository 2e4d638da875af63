//! # Quota Gate
//!
//! Enforces plan limits on how many stores and users an owner may run.
//!
//! ## Check Folded Into the Insert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ count → decide → insert           (two callers both see N-1)         │
//! │                                                                         │
//! │  ✅ BEGIN                                                               │
//! │       INSERT store          ← first statement, takes the writer lock    │
//! │       COUNT active stores   ← includes our row                          │
//! │       decide on count - 1                                               │
//! │     COMMIT, or drop the transaction and roll the insert back            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Concurrent creations for the same owner queue on the writer lock, so each
//! one counts the rows committed before it.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use stockbook_core::{
    new_id, NewStore, NewUser, QuotaDecision, QuotaResource, Store, User, ValidationError,
};

use crate::error::{DbError, LedgerError, LedgerResult};
use crate::repository::{subscription, tenancy};

/// Plan-limit checks and quota-enforcing creation of stores and users.
#[derive(Debug, Clone)]
pub struct QuotaGate {
    pool: SqlitePool,
}

impl QuotaGate {
    pub fn new(pool: SqlitePool) -> Self {
        QuotaGate { pool }
    }

    /// Whether `owner_id` may open one more store.
    pub async fn can_create_store(&self, owner_id: &str) -> LedgerResult<QuotaDecision> {
        self.decide(QuotaResource::Store, owner_id).await
    }

    /// Whether `owner_id` may add one more user across their stores.
    pub async fn can_create_user(&self, owner_id: &str) -> LedgerResult<QuotaDecision> {
        self.decide(QuotaResource::User, owner_id).await
    }

    async fn decide(&self, resource: QuotaResource, owner_id: &str) -> LedgerResult<QuotaDecision> {
        let mut tx = self.pool.begin().await?;
        let decision = evaluate(&mut tx, resource, owner_id, 0).await?;
        tx.commit().await?;

        debug!(
            owner_id = %owner_id,
            resource = %resource,
            allowed = decision.allowed,
            current = decision.current_count,
            max = decision.max_allowed,
            "Quota checked"
        );
        Ok(decision)
    }

    /// Creates a store if the owner's plan allows another one.
    ///
    /// ## Returns
    /// * `Ok(Store)` - Created and committed
    /// * `QuotaExceeded` - Limit reached or no subscription; nothing written
    pub async fn create_store(&self, input: &NewStore) -> LedgerResult<Store> {
        input.validate()?;

        let now = Utc::now();
        let store = Store {
            id: new_id(),
            owner_id: input.owner_id.trim().to_string(),
            name: input.name.trim().to_string(),
            address: input.address.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        tenancy::insert_store(&mut tx, &store).await?;

        let decision = evaluate(&mut tx, QuotaResource::Store, &store.owner_id, 1).await?;
        if let Err(denied) = decision.into_result(QuotaResource::Store) {
            warn!(owner_id = %store.owner_id, error = %denied, "Store creation refused");
            return Err(denied.into());
        }

        tx.commit().await?;

        info!(id = %store.id, owner_id = %store.owner_id, "Store created");
        Ok(store)
    }

    /// Creates a user in an active store if the store owner's plan allows.
    ///
    /// ## Returns
    /// * `Ok(User)` - Created and committed
    /// * `NotFound` - Store missing or inactive
    /// * `InvalidRequest` - Email already registered
    /// * `QuotaExceeded` - Limit reached or no subscription; nothing written
    pub async fn create_user(&self, input: &NewUser) -> LedgerResult<User> {
        input.validate()?;

        let user = User {
            id: new_id(),
            store_id: input.store_id.clone(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            role: input.role,
            is_active: true,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        let owner_id = tenancy::active_store_owner(&mut tx, &user.store_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Store", &user.store_id))?;

        tenancy::insert_user(&mut tx, &user).await.map_err(|err| match err {
            DbError::UniqueViolation { .. } => LedgerError::from(ValidationError::Duplicate {
                field: "email".to_string(),
                value: user.email.clone(),
            }),
            other => LedgerError::Db(other),
        })?;

        let decision = evaluate(&mut tx, QuotaResource::User, &owner_id, 1).await?;
        if let Err(denied) = decision.into_result(QuotaResource::User) {
            warn!(owner_id = %owner_id, error = %denied, "User creation refused");
            return Err(denied.into());
        }

        tx.commit().await?;

        info!(id = %user.id, store_id = %user.store_id, role = ?user.role, "User created");
        Ok(user)
    }
}

/// Decision for `owner_id`, discounting `pending` rows this transaction just
/// inserted.
async fn evaluate(
    conn: &mut SqliteConnection,
    resource: QuotaResource,
    owner_id: &str,
    pending: i64,
) -> LedgerResult<QuotaDecision> {
    let limits = subscription::plan_limits(conn, owner_id).await?;
    let counted = match resource {
        QuotaResource::Store => tenancy::count_active_stores(conn, owner_id).await?,
        QuotaResource::User => tenancy::count_active_users(conn, owner_id).await?,
    };

    Ok(QuotaDecision::evaluate(resource, limits.as_ref(), counted - pending))
}
