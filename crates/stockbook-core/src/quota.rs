//! # Quota Rules
//!
//! Plan limits on how many stores and users an owner may have.
//!
//! ```text
//! owner ──► newest active|pending subscription ──► plan (max_stores, max_users)
//!                │
//!                └── none → denied, max_allowed = 0
//!
//! allowed  ⇔  current_count < max_allowed
//! ```
//!
//! The database layer supplies the counts and the plan; the decision itself
//! is computed here.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// Reason given when the owner has nothing that grants quota.
pub const NO_SUBSCRIPTION_REASON: &str = "no active subscription";

/// What is being counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuotaResource {
    Store,
    User,
}

impl fmt::Display for QuotaResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaResource::Store => f.write_str("store"),
            QuotaResource::User => f.write_str("user"),
        }
    }
}

/// The limits of the plan currently granting quota to an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub plan_id: String,
    pub plan_name: String,
    pub max_stores: i64,
    pub max_users: i64,
}

impl PlanLimits {
    pub fn limit_for(&self, resource: QuotaResource) -> i64 {
        match resource {
            QuotaResource::Store => self.max_stores,
            QuotaResource::User => self.max_users,
        }
    }
}

/// Whether one more store or user may be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuotaDecision {
    pub allowed: bool,
    pub current_count: i64,
    pub max_allowed: i64,
    pub reason: Option<String>,
}

impl QuotaDecision {
    /// Decides from the owner's plan (if any) and the current count.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::quota::{PlanLimits, QuotaDecision, QuotaResource};
    ///
    /// let plan = PlanLimits {
    ///     plan_id: "basic".into(),
    ///     plan_name: "Basic".into(),
    ///     max_stores: 2,
    ///     max_users: 5,
    /// };
    /// let decision = QuotaDecision::evaluate(QuotaResource::Store, Some(&plan), 2);
    /// assert!(!decision.allowed);
    /// assert_eq!(decision.max_allowed, 2);
    /// ```
    pub fn evaluate(
        resource: QuotaResource,
        limits: Option<&PlanLimits>,
        current_count: i64,
    ) -> Self {
        let Some(limits) = limits else {
            return QuotaDecision {
                allowed: false,
                current_count,
                max_allowed: 0,
                reason: Some(NO_SUBSCRIPTION_REASON.to_string()),
            };
        };

        let max_allowed = limits.limit_for(resource);
        if current_count < max_allowed {
            QuotaDecision {
                allowed: true,
                current_count,
                max_allowed,
                reason: None,
            }
        } else {
            QuotaDecision {
                allowed: false,
                current_count,
                max_allowed,
                reason: Some(format!(
                    "plan {} allows at most {} {}s",
                    limits.plan_name, max_allowed, resource
                )),
            }
        }
    }

    /// Turns a denial into [`CoreError::QuotaExceeded`].
    pub fn into_result(self, resource: QuotaResource) -> CoreResult<Self> {
        if self.allowed {
            return Ok(self);
        }

        Err(CoreError::QuotaExceeded {
            resource,
            current_count: self.current_count,
            max_allowed: self.max_allowed,
            reason: self
                .reason
                .unwrap_or_else(|| NO_SUBSCRIPTION_REASON.to_string()),
        })
    }
}
