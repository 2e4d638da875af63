//! # Subscription Repository
//!
//! Billing plans and the subscriptions that tie owners to them.
//!
//! ## Which Plan Applies?
//! ```text
//! user_subscriptions for owner O (newest first)
//!   ├── cancelled   (2026-09-01)   skipped
//!   ├── pending     (2026-08-15)   ◄── supplies the limits
//!   └── active      (2026-01-01)
//! ```
//! The newest subscription whose status grants quota wins, whether or not
//! its plan has since been retired.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use stockbook_core::validation::validate_id;
use stockbook_core::{
    new_id, CoreError, NewPlan, PlanLimits, SubscriptionPlan, SubscriptionStatus,
    UserSubscription, ValidationError,
};

use crate::error::{DbError, DbResult, LedgerError, LedgerResult};

/// Repository for plans and subscriptions.
#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
    pool: SqlitePool,
}

impl SubscriptionRepository {
    /// Creates a new SubscriptionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SubscriptionRepository { pool }
    }

    /// Creates an active plan. Plan names are unique.
    pub async fn create_plan(&self, input: &NewPlan) -> LedgerResult<SubscriptionPlan> {
        input.validate()?;

        let plan = SubscriptionPlan {
            id: new_id(),
            name: input.name.trim().to_string(),
            max_stores: input.max_stores,
            max_users: input.max_users,
            price: input.price,
            is_active: true,
        };

        sqlx::query(
            "INSERT INTO subscription_plans (id, name, max_stores, max_users, price, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&plan.id)
        .bind(&plan.name)
        .bind(plan.max_stores)
        .bind(plan.max_users)
        .bind(plan.price)
        .bind(plan.is_active)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)
        .map_err(|err| match err {
            DbError::UniqueViolation { .. } => LedgerError::from(ValidationError::Duplicate {
                field: "name".to_string(),
                value: plan.name.clone(),
            }),
            other => LedgerError::Db(other),
        })?;

        info!(id = %plan.id, name = %plan.name, "Plan created");
        Ok(plan)
    }

    pub async fn get_plan(&self, id: &str) -> DbResult<Option<SubscriptionPlan>> {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(concat!(
            "SELECT ",
            plan_columns!(),
            " FROM subscription_plans WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    pub async fn get_plan_by_name(&self, name: &str) -> DbResult<Option<SubscriptionPlan>> {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(concat!(
            "SELECT ",
            plan_columns!(),
            " FROM subscription_plans WHERE name = ?1"
        ))
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    /// Lists every plan, cheapest first.
    pub async fn list_plans(&self) -> DbResult<Vec<SubscriptionPlan>> {
        let plans = sqlx::query_as::<_, SubscriptionPlan>(concat!(
            "SELECT ",
            plan_columns!(),
            " FROM subscription_plans ORDER BY price, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    /// Retires or re-offers a plan.
    ///
    /// A retired plan accepts no new subscriptions. Existing subscriptions
    /// keep granting its limits.
    pub async fn set_plan_active(&self, id: &str, active: bool) -> LedgerResult<SubscriptionPlan> {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(concat!(
            "UPDATE subscription_plans SET is_active = ?2 WHERE id = ?1 RETURNING ",
            plan_columns!()
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        plan.ok_or_else(|| LedgerError::not_found("SubscriptionPlan", id))
    }

    /// Subscribes an owner to a plan.
    ///
    /// ## Returns
    /// * `NotFound` - No such plan
    /// * `InvalidRequest` - The plan is retired
    pub async fn subscribe(
        &self,
        owner_id: &str,
        plan_id: &str,
        status: SubscriptionStatus,
        expires_at: Option<DateTime<Utc>>,
    ) -> LedgerResult<UserSubscription> {
        validate_id("owner_id", owner_id)?;
        validate_id("plan_id", plan_id)?;

        let plan = self
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("SubscriptionPlan", plan_id))?;

        if !plan.is_active {
            return Err(CoreError::invalid("plan_id", format!("plan {} is not offered", plan.name)).into());
        }

        let now = Utc::now();
        let subscription = UserSubscription {
            id: new_id(),
            owner_id: owner_id.to_string(),
            plan_id: plan.id,
            status,
            started_at: now,
            expires_at,
            created_at: now,
            updated_at: now,
        };

        debug!(owner_id = %owner_id, plan = %plan.name, status = ?status, "Subscribing owner");

        sqlx::query(
            "INSERT INTO user_subscriptions (
                id, owner_id, plan_id, status, started_at, expires_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&subscription.id)
        .bind(&subscription.owner_id)
        .bind(&subscription.plan_id)
        .bind(subscription.status)
        .bind(subscription.started_at)
        .bind(subscription.expires_at)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(subscription)
    }

    /// Changes a subscription's status (payment confirmed, cancelled, lapsed).
    pub async fn set_status(&self, id: &str, status: SubscriptionStatus) -> LedgerResult<UserSubscription> {
        let subscription = sqlx::query_as::<_, UserSubscription>(concat!(
            "UPDATE user_subscriptions SET status = ?2, updated_at = ?3
             WHERE id = ?1
             RETURNING ",
            subscription_columns!()
        ))
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let subscription = subscription.ok_or_else(|| LedgerError::not_found("UserSubscription", id))?;
        info!(id = %id, status = ?status, "Subscription status changed");
        Ok(subscription)
    }

    /// The subscription currently supplying the owner's limits, if any.
    pub async fn current_for_owner(&self, owner_id: &str) -> DbResult<Option<UserSubscription>> {
        let subscription = sqlx::query_as::<_, UserSubscription>(concat!(
            "SELECT ",
            subscription_columns!(),
            " FROM user_subscriptions
              WHERE owner_id = ?1 AND status IN ('active', 'pending')
              ORDER BY created_at DESC, rowid DESC
              LIMIT 1"
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Limits of the owner's newest active or pending subscription.
pub(crate) async fn plan_limits(conn: &mut SqliteConnection, owner_id: &str) -> DbResult<Option<PlanLimits>> {
    let limits = sqlx::query_as::<_, PlanLimits>(
        "SELECT p.id AS plan_id, p.name AS plan_name, p.max_stores, p.max_users
         FROM user_subscriptions s
         JOIN subscription_plans p ON p.id = s.plan_id
         WHERE s.owner_id = ?1 AND s.status IN ('active', 'pending')
         ORDER BY s.created_at DESC, s.rowid DESC
         LIMIT 1",
    )
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(limits)
}
