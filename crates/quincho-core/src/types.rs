//! # Domain Types
//!
//! Core domain types used throughout Quincho POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │    Receipt      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  order_id (1:1) │       │
//! │  │  category_id    │   │  origin/status  │   │  folio (unique) │       │
//! │  │  price_cents    │   │  manual_total   │   │  total_cents    │       │
//! │  │  active         │   │  OrderLines[]   │   │  emitted_at     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                         │
//! │  │ InventoryItem   │   │ InventoryMovement   │                         │
//! │  │  stock (signed) │◄──│  kind entry|exit    │  append-only ledger     │
//! │  │  cost/sale      │   │  quantity, reason   │                         │
//! │  └─────────────────┘   └─────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Order lines freeze the product name and unit price at creation time, so
//! historical orders and receipts stay truthful after catalog edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Catalog
// =============================================================================

/// A menu category. Deleting a category detaches its products.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    /// Unique display name.
    pub name: String,
    pub description: String,
    /// Inactive categories disappear from the public menu.
    pub active: bool,
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    /// Category this product belongs to (detached products allowed).
    pub category_id: Option<i64>,
    pub name: String,
    pub description: String,
    /// Price in cents (smallest currency unit).
    pub price_cents: i64,
    /// Whether product is shown and sellable (soft delete).
    pub active: bool,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A promotion: a named bundle sold at its own price.
///
/// Promotions live in a separate id space from products; inside a cart
/// their keys are offset by [`crate::PROMO_ID_OFFSET`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub active: bool,
}

impl Promotion {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Order Enums
// =============================================================================

/// Where an order was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderOrigin {
    /// Placed at the presential register.
    Counter,
    /// Placed through the web checkout.
    Web,
}

impl OrderOrigin {
    /// Human-facing label, used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            OrderOrigin::Counter => "Counter",
            OrderOrigin::Web => "Web",
        }
    }
}

/// Kitchen workflow status of an order.
///
/// The machine is advisory: any status can be written at any time, the
/// kitchen panel is trusted to click sensibly. What IS derived mechanically
/// is kitchen visibility (see [`OrderStatus::kitchen_visible`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InKitchen,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether an order in this status appears on the kitchen display.
    ///
    /// `pending` and `in_kitchen` are visible; `ready` and beyond are not.
    #[inline]
    pub fn kitchen_visible(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InKitchen)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InKitchen => "in_kitchen",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Card => "card",
        }
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Pickup,
    Delivery,
}

// =============================================================================
// Order
// =============================================================================

/// An order placed at the register or through the web checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub origin: OrderOrigin,
    /// Free-form channel label ("counter", "web", "delivery", ...).
    pub channel: String,
    pub status: OrderStatus,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub delivery_type: Option<DeliveryType>,
    /// Total written at the register; used only when the order has no lines.
    pub manual_total_cents: i64,
    /// Only visible orders appear on the kitchen display.
    pub kitchen_visible: bool,
    /// Free-form order note ("no onions", table number, ...).
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn manual_total(&self) -> Money {
        Money::from_cents(self.manual_total_cents)
    }
}

/// A line item in an order.
/// Uses the snapshot pattern to freeze product data at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    /// Originating product; `None` for promotion lines.
    pub product_id: Option<i64>,
    /// Product name at order time (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in cents at order time (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit price, in cents.
    pub subtotal_cents: i64,
}

impl OrderLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// Order total precedence rule.
///
/// ## The Invariant
/// With at least one line the total is the line-subtotal sum, full stop —
/// the manual total is ignored even when set. With zero lines the manual
/// total stands in (defaulting to zero). The total is always re-derived
/// from its sources on read; it is never stored, so it can never drift.
pub fn order_total(lines: &[OrderLine], manual_total: Money) -> Money {
    if lines.is_empty() {
        manual_total
    } else {
        lines.iter().map(OrderLine::subtotal).sum()
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// A receipt bound 1:1 to an order.
///
/// The folio is a globally unique, strictly increasing number. The total
/// is a snapshot at emission time: a receipt is a point-in-time document
/// and never changes when order lines are edited later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Receipt {
    pub id: i64,
    pub order_id: i64,
    pub folio: i64,
    pub total_cents: i64,
    /// Free-form payment method label ("cash", "manual", ...).
    pub payment_method: String,
    pub emitted_at: DateTime<Utc>,
}

impl Receipt {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// A non-perishable inventory item.
///
/// `stock` is the running balance derived from the movement ledger. It is
/// signed on purpose: the business accepts it going negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    /// Optional unique stock keeping unit.
    pub sku: Option<String>,
    pub stock: i64,
    pub cost_price_cents: i64,
    pub sale_price_cents: i64,
}

impl InventoryItem {
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// stock × cost price, the item's contribution to inventory valuation.
    #[inline]
    pub fn valuation(&self) -> Money {
        Money::from_cents(self.stock * self.cost_price_cents)
    }
}

/// Direction of an inventory movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Entry,
    Exit,
}

impl MovementKind {
    /// Signed stock delta for a movement of this kind and quantity.
    #[inline]
    pub fn delta(&self, quantity: i64) -> i64 {
        match self {
            MovementKind::Entry => quantity,
            MovementKind::Exit => -quantity,
        }
    }
}

/// One entry in the append-only inventory ledger.
///
/// Movements are never edited: the stock adjustment happens exactly once,
/// at creation, in the same transaction as the insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryMovement {
    pub id: i64,
    pub item_id: i64,
    pub kind: MovementKind,
    pub quantity: i64,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, qty: i64, unit_cents: i64) -> OrderLine {
        OrderLine {
            id,
            order_id: 1,
            product_id: Some(id),
            product_name: format!("Product {}", id),
            quantity: qty,
            unit_price_cents: unit_cents,
            subtotal_cents: qty * unit_cents,
        }
    }

    #[test]
    fn test_total_uses_line_sum_when_lines_exist() {
        let lines = vec![line(1, 2, 300_000), line(2, 1, 500_000)];
        // Manual total must be ignored no matter what it says
        let total = order_total(&lines, Money::from_cents(999));
        assert_eq!(total.cents(), 1_100_000);
    }

    #[test]
    fn test_total_falls_back_to_manual_without_lines() {
        let total = order_total(&[], Money::from_cents(1_500_000));
        assert_eq!(total.cents(), 1_500_000);
    }

    #[test]
    fn test_total_zero_line_sum_still_wins() {
        // A line summing to zero still takes precedence over the manual total
        let lines = vec![line(1, 1, 0)];
        assert_eq!(order_total(&lines, Money::from_cents(5000)), Money::zero());
    }

    #[test]
    fn test_kitchen_visibility_follows_status() {
        assert!(OrderStatus::Pending.kitchen_visible());
        assert!(OrderStatus::InKitchen.kitchen_visible());
        assert!(!OrderStatus::Ready.kitchen_visible());
        assert!(!OrderStatus::Delivered.kitchen_visible());
        assert!(!OrderStatus::Cancelled.kitchen_visible());
    }

    #[test]
    fn test_movement_delta() {
        assert_eq!(MovementKind::Entry.delta(5), 5);
        assert_eq!(MovementKind::Exit.delta(5), -5);
    }

    #[test]
    fn test_item_valuation() {
        let item = InventoryItem {
            id: 1,
            name: "Napkins".to_string(),
            sku: Some("NAP-01".to_string()),
            stock: 12,
            cost_price_cents: 250,
            sale_price_cents: 400,
        };
        assert_eq!(item.valuation().cents(), 3000);
    }
}
