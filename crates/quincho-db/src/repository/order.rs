//! # Order Repository
//!
//! Database operations for orders, order lines, and the kitchen workflow.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create() → Order { status: Pending } + snapshot lines          │
//! │         (register sale or web checkout, one transaction)               │
//! │                                                                         │
//! │  2. KITCHEN                                                            │
//! │     └── kitchen_board() shows pending/in_kitchen visible orders        │
//! │     └── set_status() → visibility re-derived from the new status       │
//! │     └── hide() → removed from the board without touching status        │
//! │                                                                         │
//! │  3. TOTAL (never stored)                                               │
//! │     └── total() = line sum if any lines, else manual total             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The status machine is deliberately permissive: any status can be written
//! at any time. Visibility is the one thing derived mechanically.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use quincho_core::{
    order_total, DeliveryType, Money, Order, OrderLine, OrderOrigin, OrderStatus, PaymentMethod,
};

const ORDER_COLUMNS: &str = "id, origin, channel, status, customer_name, customer_phone, \
     customer_address, payment_method, delivery_type, manual_total_cents, kitchen_visible, \
     note, created_at, updated_at";

/// Input for a new order line (snapshot fields already resolved).
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub origin: OrderOrigin,
    pub channel: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub delivery_type: Option<DeliveryType>,
    pub manual_total_cents: i64,
    pub note: String,
    pub lines: Vec<NewOrderLine>,
}

impl NewOrder {
    /// A bare counter order with no lines (manual-total sale).
    pub fn counter(manual_total_cents: i64) -> Self {
        NewOrder {
            origin: OrderOrigin::Counter,
            channel: "counter".to_string(),
            customer_name: None,
            customer_phone: None,
            customer_address: None,
            payment_method: None,
            delivery_type: None,
            manual_total_cents,
            note: String::new(),
            lines: Vec::new(),
        }
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order with its snapshot lines in one transaction.
    ///
    /// New orders start `pending` and kitchen-visible. Line subtotals are
    /// computed here, once, at freeze time.
    pub async fn create(&self, new: &NewOrder) -> DbResult<Order> {
        let now = Utc::now();
        debug!(origin = ?new.origin, lines = new.lines.len(), "Creating order");

        let mut tx = self.pool.begin().await?;

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (
                origin, channel, status, customer_name, customer_phone, customer_address,
                payment_method, delivery_type, manual_total_cents, kitchen_visible, note,
                created_at, updated_at
             ) VALUES (?1, ?2, 'pending', ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?10, ?10)
             RETURNING id",
        )
        .bind(new.origin)
        .bind(&new.channel)
        .bind(&new.customer_name)
        .bind(&new.customer_phone)
        .bind(&new.customer_address)
        .bind(new.payment_method)
        .bind(new.delivery_type)
        .bind(new.manual_total_cents)
        .bind(&new.note)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for line in &new.lines {
            sqlx::query(
                "INSERT INTO order_lines (
                    order_id, product_id, product_name, quantity, unit_price_cents, subtotal_cents
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.quantity * line.unit_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    /// Gets an order by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// Gets all lines of an order, in insertion order.
    pub async fn lines(&self, order_id: i64) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            "SELECT id, order_id, product_id, product_name, quantity, unit_price_cents,
                    subtotal_cents
             FROM order_lines WHERE order_id = ?1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    /// Computes the order total from its current lines and manual total.
    ///
    /// The total is derived on every read, never stored.
    pub async fn total(&self, order_id: i64) -> DbResult<Money> {
        let order = self
            .get(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;
        let lines = self.lines(order_id).await?;
        Ok(order_total(&lines, order.manual_total()))
    }

    /// Appends a snapshot line to an existing order.
    pub async fn add_line(&self, order_id: i64, line: &NewOrderLine) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO order_lines (
                order_id, product_id, product_name, quantity, unit_price_cents, subtotal_cents
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.quantity * line.unit_price_cents)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Removes a line from an order.
    pub async fn delete_line(&self, line_id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM order_lines WHERE id = ?1")
            .bind(line_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Sets the order status.
    ///
    /// Any status may be written at any time; no transition checks. Kitchen
    /// visibility is re-derived from the new status in the same statement.
    pub async fn set_status(&self, id: i64, status: OrderStatus) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET status = ?2, kitchen_visible = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(status)
        .bind(status.kitchen_visible())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }
        Ok(())
    }

    /// Hides an order from the kitchen board without touching its status.
    pub async fn hide(&self, id: i64) -> DbResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE orders SET kitchen_visible = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }
        Ok(())
    }

    /// Orders shown on the kitchen display: visible AND in a visible status,
    /// oldest first.
    pub async fn kitchen_board(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE kitchen_visible = 1 AND status IN ('pending', 'in_kitchen')
             ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Most recent orders, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Updates the register-entered manual total.
    pub async fn update_manual_total(&self, id: i64, cents: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET manual_total_cents = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
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
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn line(name: &str, qty: i64, cents: i64) -> NewOrderLine {
        NewOrderLine {
            product_id: None,
            product_name: name.to_string(),
            quantity: qty,
            unit_price_cents: cents,
        }
    }

    #[tokio::test]
    async fn test_create_order_with_lines() {
        let db = test_db().await;
        let repo = db.orders();

        let mut new = NewOrder::counter(0);
        new.lines = vec![line("Completo", 2, 350_000), line("Bebida", 1, 150_000)];
        let order = repo.create(&new).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.kitchen_visible);

        let lines = repo.lines(order.id).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].subtotal_cents, 700_000);
    }

    #[tokio::test]
    async fn test_total_prefers_line_sum_over_manual() {
        let db = test_db().await;
        let repo = db.orders();

        let mut new = NewOrder::counter(999_999);
        new.lines = vec![line("Completo", 2, 350_000)];
        let order = repo.create(&new).await.unwrap();

        assert_eq!(repo.total(order.id).await.unwrap().cents(), 700_000);
    }

    #[tokio::test]
    async fn test_total_falls_back_to_manual_without_lines() {
        let db = test_db().await;
        let repo = db.orders();

        let order = repo.create(&NewOrder::counter(1_500_000)).await.unwrap();
        assert_eq!(repo.total(order.id).await.unwrap().cents(), 1_500_000);
    }

    #[tokio::test]
    async fn test_status_change_rederives_visibility() {
        let db = test_db().await;
        let repo = db.orders();
        let order = repo.create(&NewOrder::counter(0)).await.unwrap();

        repo.set_status(order.id, OrderStatus::Ready).await.unwrap();
        let fetched = repo.get(order.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, OrderStatus::Ready);
        assert!(!fetched.kitchen_visible);

        // Permissive machine: walking backwards is allowed and restores visibility
        repo.set_status(order.id, OrderStatus::InKitchen).await.unwrap();
        let fetched = repo.get(order.id).await.unwrap().unwrap();
        assert!(fetched.kitchen_visible);
    }

    #[tokio::test]
    async fn test_kitchen_board_filters_hidden_and_finished() {
        let db = test_db().await;
        let repo = db.orders();

        let visible = repo.create(&NewOrder::counter(0)).await.unwrap();
        let hidden = repo.create(&NewOrder::counter(0)).await.unwrap();
        let ready = repo.create(&NewOrder::counter(0)).await.unwrap();

        repo.hide(hidden.id).await.unwrap();
        repo.set_status(ready.id, OrderStatus::Ready).await.unwrap();

        let board = repo.kitchen_board().await.unwrap();
        let ids: Vec<i64> = board.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![visible.id]);
    }

    #[tokio::test]
    async fn test_hide_preserves_status() {
        let db = test_db().await;
        let repo = db.orders();
        let order = repo.create(&NewOrder::counter(0)).await.unwrap();

        repo.hide(order.id).await.unwrap();
        let fetched = repo.get(order.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, OrderStatus::Pending);
        assert!(!fetched.kitchen_visible);
    }

    #[tokio::test]
    async fn test_web_order_scenario() {
        // 2 × 3000.00 + 1 × 5000.00 = 11000.00, manual total ignored
        let db = test_db().await;
        let repo = db.orders();

        let mut new = NewOrder::counter(0);
        new.origin = OrderOrigin::Web;
        new.channel = "web".to_string();
        new.customer_name = Some("Ana".to_string());
        new.lines = vec![line("Completo", 2, 300_000), line("Churrasco", 1, 500_000)];
        let order = repo.create(&new).await.unwrap();

        assert_eq!(repo.total(order.id).await.unwrap().cents(), 1_100_000);
        assert!(order.kitchen_visible);
    }

    #[tokio::test]
    async fn test_set_status_unknown_order() {
        let db = test_db().await;
        let err = db
            .orders()
            .set_status(42, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
