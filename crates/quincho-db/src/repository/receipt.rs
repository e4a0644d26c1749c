//! # Receipt Repository
//!
//! Receipt emission with race-safe folio assignment.
//!
//! ## Folio Assignment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Atomic Folio Assignment                              │
//! │                                                                         │
//! │  INSERT INTO receipts (folio, ...)                                     │
//! │  VALUES ((SELECT COALESCE(MAX(folio), 0) + 1 FROM receipts), ...)      │
//! │                                                                         │
//! │  The counter read and the insert are ONE statement, so two register    │
//! │  terminals emitting at once cannot read the same MAX. The UNIQUE       │
//! │  constraint on folio backstops the whole thing: a collision aborts     │
//! │  instead of duplicating.                                               │
//! │                                                                         │
//! │  First receipt ever → folio 1.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The total written here is a snapshot: the receipt is a point-in-time
//! document and never changes when order lines are edited afterwards.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use quincho_core::Receipt;

const RECEIPT_COLUMNS: &str = "id, order_id, folio, total_cents, payment_method, emitted_at";

/// Repository for receipt database operations.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Emits the receipt for an order.
    ///
    /// ## Guarantees
    /// - Folio is assigned atomically; concurrent emission cannot duplicate
    /// - At most one receipt per order (UNIQUE order_id)
    /// - `total_cents` is frozen here and never recomputed
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] on `receipts.order_id` when the order
    /// already has a receipt.
    pub async fn emit(
        &self,
        order_id: i64,
        total_cents: i64,
        payment_method: &str,
    ) -> DbResult<Receipt> {
        let now = Utc::now();
        debug!(order_id, total_cents, "Emitting receipt");

        let receipt = sqlx::query_as::<_, Receipt>(&format!(
            "INSERT INTO receipts (order_id, folio, total_cents, payment_method, emitted_at)
             VALUES (?1, (SELECT COALESCE(MAX(folio), 0) + 1 FROM receipts), ?2, ?3, ?4)
             RETURNING {RECEIPT_COLUMNS}"
        ))
        .bind(order_id)
        .bind(total_cents)
        .bind(payment_method)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(receipt)
    }

    /// Returns the order's receipt, emitting one lazily if none exists.
    ///
    /// Used when a receipt is first viewed for an order that never went
    /// through explicit emission. A concurrent emission losing the race is
    /// fine: the winner's receipt is fetched and returned.
    pub async fn get_or_emit(
        &self,
        order_id: i64,
        total_cents: i64,
        payment_method: &str,
    ) -> DbResult<Receipt> {
        if let Some(receipt) = self.get_for_order(order_id).await? {
            return Ok(receipt);
        }

        match self.emit(order_id, total_cents, payment_method).await {
            Ok(receipt) => Ok(receipt),
            Err(err) if err.is_unique_violation_on("receipts.order_id") => self
                .get_for_order(order_id)
                .await?
                .ok_or_else(|| DbError::not_found("Receipt", order_id)),
            Err(err) => Err(err),
        }
    }

    /// Gets the receipt for an order, if one was emitted.
    pub async fn get_for_order(&self, order_id: i64) -> DbResult<Option<Receipt>> {
        let receipt = sqlx::query_as::<_, Receipt>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts WHERE order_id = ?1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(receipt)
    }

    /// Gets a receipt by folio.
    pub async fn get_by_folio(&self, folio: i64) -> DbResult<Receipt> {
        let receipt = sqlx::query_as::<_, Receipt>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts WHERE folio = ?1"
        ))
        .bind(folio)
        .fetch_optional(&self.pool)
        .await?;

        receipt.ok_or_else(|| DbError::not_found("Receipt", folio))
    }

    /// All receipts, ascending folio.
    pub async fn list(&self) -> DbResult<Vec<Receipt>> {
        let receipts = sqlx::query_as::<_, Receipt>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts ORDER BY folio"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(receipts)
    }

    /// Most recently emitted receipts, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Receipt>> {
        let receipts = sqlx::query_as::<_, Receipt>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM receipts ORDER BY folio DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(receipts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::order::{NewOrder, NewOrderLine};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn any_order(db: &Database) -> i64 {
        db.orders()
            .create(&NewOrder::counter(500_000))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_folios_start_at_one_and_increase() {
        let db = test_db().await;
        let repo = db.receipts();

        let a = any_order(&db).await;
        let b = any_order(&db).await;
        let c = any_order(&db).await;

        assert_eq!(repo.emit(a, 100, "cash").await.unwrap().folio, 1);
        assert_eq!(repo.emit(b, 200, "cash").await.unwrap().folio, 2);
        assert_eq!(repo.emit(c, 300, "card").await.unwrap().folio, 3);
    }

    #[tokio::test]
    async fn test_second_emission_for_same_order_rejected() {
        let db = test_db().await;
        let repo = db.receipts();
        let order_id = any_order(&db).await;

        repo.emit(order_id, 100, "cash").await.unwrap();
        let err = repo.emit(order_id, 100, "cash").await.unwrap_err();
        assert!(err.is_unique_violation_on("receipts.order_id"));

        // The original receipt survives untouched
        let receipt = repo.get_for_order(order_id).await.unwrap().unwrap();
        assert_eq!(receipt.folio, 1);
    }

    #[tokio::test]
    async fn test_get_or_emit_is_lazy_and_stable() {
        let db = test_db().await;
        let repo = db.receipts();
        let order_id = any_order(&db).await;

        let first = repo.get_or_emit(order_id, 500_000, "manual").await.unwrap();
        assert_eq!(first.folio, 1);
        assert_eq!(first.payment_method, "manual");

        // Subsequent views return the same document, total untouched
        let second = repo.get_or_emit(order_id, 999, "cash").await.unwrap();
        assert_eq!(second.folio, 1);
        assert_eq!(second.total_cents, 500_000);
    }

    #[tokio::test]
    async fn test_receipt_total_is_a_snapshot() {
        let db = test_db().await;

        let mut new = NewOrder::counter(0);
        new.lines = vec![NewOrderLine {
            product_id: None,
            product_name: "Completo".to_string(),
            quantity: 2,
            unit_price_cents: 350_000,
        }];
        let order = db.orders().create(&new).await.unwrap();

        let total = db.orders().total(order.id).await.unwrap();
        let receipt = db
            .receipts()
            .emit(order.id, total.cents(), "cash")
            .await
            .unwrap();
        assert_eq!(receipt.total_cents, 700_000);

        // Editing lines afterwards changes the order total, not the receipt
        db.orders()
            .add_line(
                order.id,
                &NewOrderLine {
                    product_id: None,
                    product_name: "Bebida".to_string(),
                    quantity: 1,
                    unit_price_cents: 150_000,
                },
            )
            .await
            .unwrap();

        assert_eq!(db.orders().total(order.id).await.unwrap().cents(), 850_000);
        let receipt = db.receipts().get_for_order(order.id).await.unwrap().unwrap();
        assert_eq!(receipt.total_cents, 700_000);
    }

    #[tokio::test]
    async fn test_deleted_order_folio_not_reused_while_others_exist() {
        // MAX(folio)+1 never goes backwards as long as any receipt remains
        let db = test_db().await;
        let repo = db.receipts();

        let a = any_order(&db).await;
        let b = any_order(&db).await;
        repo.emit(a, 100, "cash").await.unwrap();
        repo.emit(b, 200, "cash").await.unwrap();

        // Cascade-delete order B's receipt by deleting the order
        sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(b)
            .execute(db.pool())
            .await
            .unwrap();

        let c = any_order(&db).await;
        // Folio 2 is gone but folio 1 remains, so the next folio is 2 again;
        // uniqueness still holds at all times
        let receipt = repo.emit(c, 300, "cash").await.unwrap();
        assert_eq!(receipt.folio, 2);
    }

    #[tokio::test]
    async fn test_register_sale_scenario() {
        // Cashier types "15000.00", order is line-less, receipt carries the
        // parsed amount and the first folio
        let db = test_db().await;

        let total = quincho_core::Money::parse("15000.00").unwrap();
        let mut new = NewOrder::counter(total.cents());
        new.customer_name = Some("Ana".to_string());
        let order = db.orders().create(&new).await.unwrap();

        assert_eq!(db.orders().total(order.id).await.unwrap(), total);

        let receipt = db
            .receipts()
            .emit(order.id, total.cents(), "cash")
            .await
            .unwrap();
        assert_eq!(receipt.folio, 1);
        assert_eq!(receipt.total_cents, 1_500_000);
    }
}
