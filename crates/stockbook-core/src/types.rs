//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Tenancy              Ledger                     Cash                   │
//! │  ─────────────        ─────────────────────      ─────────────────      │
//! │  SubscriptionPlan     Product  (stock, min)      CashFlowEntry          │
//! │  UserSubscription     Sale ──┬── SaleItem        Customer               │
//! │  Store                       └── InventoryMovement                      │
//! │  User                                                                   │
//! │                                                                         │
//! │  Every ledger row carries store_id: the tenant boundary.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 string, immutable, used for database relations
//! - Business ID: (sku, receipt_number, email) human-readable and unique per scope
//!
//! ## Lifecycle
//! - `InventoryMovement`, `Sale` and `SaleItem` are written once, never changed
//! - `Product`, `Store` and `User` are soft-deactivated via `is_active`

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::validation;

/// Generates a fresh entity id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Tenancy
// =============================================================================

/// A physical shop owned by an owner account. The tenant boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    pub owner_id: String,
    pub name: String,
    pub address: Option<String>,
}

impl NewStore {
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_id("owner_id", &self.owner_id)?;
        validation::validate_display_name("name", &self.name)?;
        Ok(())
    }
}

/// What a user may do inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Owner,
    Manager,
    Cashier,
}

/// A staff member attached to one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub store_id: String,
    pub name: String,
    /// Unique across all tenants.
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub store_id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl NewUser {
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_id("store_id", &self.store_id)?;
        validation::validate_display_name("name", &self.name)?;
        validation::validate_email(&self.email)?;
        Ok(())
    }
}

/// A billing plan with hard limits on stores and users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub max_stores: i64,
    pub max_users: i64,
    pub price: Money,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewPlan {
    pub name: String,
    pub max_stores: i64,
    pub max_users: i64,
    pub price: Money,
}

impl NewPlan {
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_display_name("name", &self.name)?;
        validation::validate_limit("max_stores", self.max_stores)?;
        validation::validate_limit("max_users", self.max_users)?;
        validation::validate_price("price", self.price)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    /// Awaiting payment confirmation; limits already apply.
    Pending,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    /// Whether a subscription in this status supplies quota limits.
    pub const fn grants_quota(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Pending)
    }
}

/// Links an owner to a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserSubscription {
    pub id: String,
    pub owner_id: String,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product stocked by one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store this product belongs to.
    pub store_id: String,

    /// Stock Keeping Unit, unique per store.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.), unique per store when present.
    pub barcode: Option<String>,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    pub description: Option<String>,

    /// Default selling price. A sale line may carry its own unit price.
    pub selling_price: Money,

    /// Cost price, for margin reporting.
    pub purchase_price: Money,

    /// Stock on hand. Never negative.
    pub stock: Quantity,

    /// Stock the product was created with; the base of reconciliation.
    pub initial_stock: Quantity,

    /// Reorder threshold. `stock <= min_stock_level` means low stock.
    pub min_stock_level: Quantity,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether the product is at or below its reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock_level
    }

    /// Checks whether `demand` can be taken from stock.
    #[inline]
    pub fn can_supply(&self, demand: Quantity) -> bool {
        self.stock >= demand
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub store_id: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub selling_price: Money,
    #[serde(default)]
    pub purchase_price: Money,
    #[serde(default)]
    pub initial_stock: Quantity,
    #[serde(default)]
    pub min_stock_level: Quantity,
}

impl NewProduct {
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_id("store_id", &self.store_id)?;
        validation::validate_sku(&self.sku)?;
        if let Some(barcode) = &self.barcode {
            validation::validate_barcode(barcode)?;
        }
        validation::validate_product_name(&self.name)?;
        validation::validate_price("selling_price", self.selling_price)?;
        validation::validate_price("purchase_price", self.purchase_price)?;
        validation::validate_stock_level("initial_stock", self.initial_stock)?;
        validation::validate_stock_level("min_stock_level", self.min_stock_level)?;
        Ok(())
    }
}

/// Partial update of catalogue details. Stock is never updated here; it only
/// moves through sales and adjustments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub selling_price: Option<Money>,
    pub purchase_price: Option<Money>,
    pub min_stock_level: Option<Quantity>,
}

impl ProductUpdate {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(name) = &self.name {
            validation::validate_product_name(name)?;
        }
        if let Some(barcode) = &self.barcode {
            validation::validate_barcode(barcode)?;
        }
        if let Some(price) = self.selling_price {
            validation::validate_price("selling_price", price)?;
        }
        if let Some(price) = self.purchase_price {
            validation::validate_price("purchase_price", price)?;
        }
        if let Some(level) = self.min_stock_level {
            validation::validate_stock_level("min_stock_level", level)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &ProductUpdate::default()
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// Sales are only ever written complete: there is no draft stage in the
/// ledger and no void (returns are booked as inventory movements).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[default]
    Completed,
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    /// Card payment on an external terminal.
    Card,
    Transfer,
    EWallet,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub store_id: String,
    pub cashier_id: String,
    /// `YYYYMMDD-NNNN`, unique per store.
    pub receipt_number: String,
    pub customer_id: Option<String>,
    /// Σ line totals.
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    /// subtotal − discount + tax.
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: Quantity,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// unit_price × quantity, rounded half to even.
    pub line_total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Inventory Movement
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    /// Direction of a signed quantity.
    pub fn for_delta(delta: Quantity) -> Self {
        if delta.is_negative() {
            MovementType::Out
        } else {
            MovementType::In
        }
    }
}

/// Why stock moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    /// Written by the sale processor only.
    Sale,
    Restock,
    Adjustment,
    Return,
    Damage,
}

impl MovementReason {
    /// The direction a reason forces, if any. `Adjustment` goes either way.
    pub const fn required_direction(&self) -> Option<MovementType> {
        match self {
            MovementReason::Sale | MovementReason::Damage => Some(MovementType::Out),
            MovementReason::Restock | MovementReason::Return => Some(MovementType::In),
            MovementReason::Adjustment => None,
        }
    }
}

/// One append-only entry in the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryMovement {
    pub id: String,
    pub store_id: String,
    pub product_id: String,
    pub movement_type: MovementType,
    /// Magnitude, always > 0. Direction comes from `movement_type`.
    pub quantity: Quantity,
    pub reason: MovementReason,
    /// Sale id for sale movements.
    pub reference_id: Option<String>,
    pub note: Option<String>,
    pub actor_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl InventoryMovement {
    /// `+quantity` for `in`, `-quantity` for `out`.
    pub fn signed_quantity(&self) -> Quantity {
        match self.movement_type {
            MovementType::In => self.quantity,
            MovementType::Out => -self.quantity,
        }
    }
}

/// A manual stock change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub store_id: String,
    pub product_id: String,
    /// Signed: positive adds stock, negative removes it.
    pub quantity: Quantity,
    pub reason: MovementReason,
    pub note: Option<String>,
    pub actor_id: String,
}

impl StockAdjustment {
    /// Pure checks, before any row is locked.
    ///
    /// ## Rules
    /// - quantity ≠ 0 and |quantity| ≤ MAX_ADJUSTMENT_QUANTITY
    /// - `sale` is reserved for the sale processor
    /// - restock and return add stock; damage removes it
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_id("store_id", &self.store_id)?;
        validation::validate_id("product_id", &self.product_id)?;
        validation::validate_id("actor_id", &self.actor_id)?;
        validation::validate_adjustment_quantity(self.quantity)?;
        if let Some(note) = &self.note {
            validation::validate_note(note)?;
        }

        if self.reason == MovementReason::Sale {
            return Err(CoreError::invalid(
                "reason",
                "sale movements are recorded by the sale processor",
            ));
        }

        if let Some(direction) = self.reason.required_direction() {
            if direction != MovementType::for_delta(self.quantity) {
                return Err(CoreError::InvalidRequest(ValidationError::Rejected {
                    field: "quantity".to_string(),
                    reason: format!("{:?} must move stock {:?}", self.reason, direction)
                        .to_lowercase(),
                }));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Operation Results
// =============================================================================

/// Everything a committed sale wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    /// One `out` movement per item, in item order.
    pub movements: Vec<InventoryMovement>,
}

/// A committed stock adjustment: the product after the change and the
/// movement that records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedStock {
    pub product: Product,
    pub movement: InventoryMovement,
}

// =============================================================================
// Customers & Cash Flow
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub store_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl NewCustomer {
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_id("store_id", &self.store_id)?;
        validation::validate_display_name("name", &self.name)?;
        if let Some(email) = &self.email {
            validation::validate_email(email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    /// Owed to the store by `customer_id` (income) or by the store (expense).
    Unpaid,
}

/// Money in or out of the till that is not a sale: supplier bills, rent,
/// credit sales owed by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowEntry {
    pub id: String,
    pub store_id: String,
    pub flow_type: FlowType,
    /// Always positive; direction comes from `flow_type`.
    pub amount: Money,
    pub payment_status: PaymentStatus,
    pub category: String,
    pub description: Option<String>,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    /// Business day the entry belongs to.
    #[ts(as = "String")]
    pub entry_date: NaiveDate,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewCashFlowEntry {
    pub store_id: String,
    pub flow_type: FlowType,
    pub amount: Money,
    pub payment_status: PaymentStatus,
    pub category: String,
    pub description: Option<String>,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    #[ts(as = "String")]
    pub entry_date: NaiveDate,
    pub created_by: String,
}

impl NewCashFlowEntry {
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_id("store_id", &self.store_id)?;
        validation::validate_id("created_by", &self.created_by)?;
        validation::validate_display_name("category", &self.category)?;
        if !self.amount.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn adjustment(quantity: Quantity, reason: MovementReason) -> StockAdjustment {
        StockAdjustment {
            store_id: "store-1".to_string(),
            product_id: "prod-1".to_string(),
            quantity,
            reason,
            note: None,
            actor_id: "user-1".to_string(),
        }
    }

    #[test]
    fn test_signed_quantity() {
        let mut movement = InventoryMovement {
            id: new_id(),
            store_id: "s".to_string(),
            product_id: "p".to_string(),
            movement_type: MovementType::Out,
            quantity: Quantity::from_units(3),
            reason: MovementReason::Sale,
            reference_id: Some("sale".to_string()),
            note: None,
            actor_id: "u".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(movement.signed_quantity(), Quantity::from_units(-3));

        movement.movement_type = MovementType::In;
        assert_eq!(movement.signed_quantity(), Quantity::from_units(3));
    }

    #[test]
    fn test_sale_reason_is_reserved() {
        let err = adjustment(Quantity::from_units(-1), MovementReason::Sale)
            .validate()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[test]
    fn test_adjustment_direction_rules() {
        assert!(adjustment(Quantity::from_units(5), MovementReason::Restock)
            .validate()
            .is_ok());
        assert!(adjustment(Quantity::from_units(-5), MovementReason::Restock)
            .validate()
            .is_err());
        assert!(adjustment(Quantity::from_units(-1), MovementReason::Damage)
            .validate()
            .is_ok());
        assert!(adjustment(Quantity::from_units(-1), MovementReason::Adjustment)
            .validate()
            .is_ok());
        assert!(adjustment(Quantity::from_units(2), MovementReason::Adjustment)
            .validate()
            .is_ok());
        assert!(adjustment(Quantity::zero(), MovementReason::Adjustment)
            .validate()
            .is_err());
    }

    #[test]
    fn test_subscription_statuses_granting_quota() {
        assert!(SubscriptionStatus::Active.grants_quota());
        assert!(SubscriptionStatus::Pending.grants_quota());
        assert!(!SubscriptionStatus::Cancelled.grants_quota());
        assert!(!SubscriptionStatus::Expired.grants_quota());
    }

    #[test]
    fn test_product_update_is_empty() {
        assert!(ProductUpdate::default().is_empty());
        let update = ProductUpdate {
            name: Some("Cola Zero".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::EWallet).unwrap(),
            "\"e_wallet\""
        );
        assert_eq!(serde_json::to_string(&MovementType::In).unwrap(), "\"in\"");
    }
}
