//! # Inventory Repository
//!
//! Items and the append-only movement ledger.
//!
//! ## Ledger Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Append-Only Movement Ledger                          │
//! │                                                                         │
//! │  record_movement(item, Entry, 10)                                      │
//! │       │                                                                 │
//! │       ▼  (one transaction)                                             │
//! │  INSERT INTO inventory_movements (...)                                 │
//! │  UPDATE inventory_items SET stock = stock + 10                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Movements are never updated or deleted: the stock adjustment          │
//! │  happens exactly once, at creation. Correcting a mistake means         │
//! │  recording a compensating movement.                                    │
//! │                                                                         │
//! │  Stock is signed and may go negative (exit larger than balance).       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use quincho_core::{InventoryItem, InventoryMovement, MovementKind, CRITICAL_STOCK_THRESHOLD};

const ITEM_COLUMNS: &str = "id, name, sku, stock, cost_price_cents, sale_price_cents";
const MOVEMENT_COLUMNS: &str = "id, item_id, kind, quantity, reason, occurred_at";

/// Input for creating or updating an inventory item.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub name: String,
    pub sku: Option<String>,
    pub cost_price_cents: i64,
    pub sale_price_cents: i64,
}

/// Repository for inventory database operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// All items ordered by name.
    pub async fn list_items(&self) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn get_item(&self, id: i64) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    /// Creates an item with zero stock. Stock only ever changes through
    /// [`Self::record_movement`].
    pub async fn create_item(&self, input: &ItemInput) -> DbResult<InventoryItem> {
        debug!(name = %input.name, "Creating inventory item");

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "INSERT INTO inventory_items (name, sku, stock, cost_price_cents, sale_price_cents)
             VALUES (?1, ?2, 0, ?3, ?4)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.sku)
        .bind(input.cost_price_cents)
        .bind(input.sale_price_cents)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Updates item master data. Stock is deliberately not updatable here.
    pub async fn update_item(&self, id: i64, input: &ItemInput) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE inventory_items SET name = ?2, sku = ?3, cost_price_cents = ?4,
             sale_price_cents = ?5 WHERE id = ?1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.sku)
        .bind(input.cost_price_cents)
        .bind(input.sale_price_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", id));
        }
        Ok(())
    }

    /// Deletes an item and, by cascade, its movement history.
    pub async fn delete_item(&self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM inventory_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Items at or below the critical stock threshold, most starved first,
    /// name as tiebreaker.
    pub async fn critical_items(&self) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items
             WHERE stock <= ?1 ORDER BY stock, name"
        ))
        .bind(CRITICAL_STOCK_THRESHOLD)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Total inventory valuation: SUM(stock × cost price), in cents.
    pub async fn total_valuation(&self) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(stock * cost_price_cents) FROM inventory_items",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total.unwrap_or(0))
    }

    // =========================================================================
    // Movements
    // =========================================================================

    /// Records a movement and adjusts the item's stock, atomically.
    ///
    /// This is the only write path for stock. The ledger row and the balance
    /// update commit together or not at all.
    pub async fn record_movement(
        &self,
        item_id: i64,
        kind: MovementKind,
        quantity: i64,
        reason: &str,
    ) -> DbResult<InventoryMovement> {
        let now = Utc::now();
        debug!(item_id, ?kind, quantity, "Recording inventory movement");

        let mut tx = self.pool.begin().await?;

        let movement = sqlx::query_as::<_, InventoryMovement>(&format!(
            "INSERT INTO inventory_movements (item_id, kind, quantity, reason, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {MOVEMENT_COLUMNS}"
        ))
        .bind(item_id)
        .bind(kind)
        .bind(quantity)
        .bind(reason)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query("UPDATE inventory_items SET stock = stock + ?2 WHERE id = ?1")
            .bind(item_id)
            .bind(kind.delta(quantity))
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", item_id));
        }

        tx.commit().await?;
        Ok(movement)
    }

    /// Movement history for one item, newest first.
    pub async fn movements(&self, item_id: i64, limit: i64) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_movements
             WHERE item_id = ?1 ORDER BY occurred_at DESC, id DESC LIMIT ?2"
        ))
        .bind(item_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    /// Most recent movements across all items, newest first.
    pub async fn recent_movements(&self, limit: i64) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_movements
             ORDER BY occurred_at DESC, id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
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

    fn napkins() -> ItemInput {
        ItemInput {
            name: "Servilletas".to_string(),
            sku: Some("SERV-01".to_string()),
            cost_price_cents: 250,
            sale_price_cents: 400,
        }
    }

    #[tokio::test]
    async fn test_movement_adjusts_stock_once() {
        let db = test_db().await;
        let repo = db.inventory();
        let item = repo.create_item(&napkins()).await.unwrap();

        repo.record_movement(item.id, MovementKind::Entry, 10, "compra")
            .await
            .unwrap();
        repo.record_movement(item.id, MovementKind::Exit, 3, "servicio")
            .await
            .unwrap();

        let item = repo.get_item(item.id).await.unwrap().unwrap();
        assert_eq!(item.stock, 7);

        let movements = repo.movements(item.id, 10).await.unwrap();
        assert_eq!(movements.len(), 2);
    }

    #[tokio::test]
    async fn test_stock_may_go_negative() {
        let db = test_db().await;
        let repo = db.inventory();
        let item = repo.create_item(&napkins()).await.unwrap();

        repo.record_movement(item.id, MovementKind::Exit, 4, "merma")
            .await
            .unwrap();

        let item = repo.get_item(item.id).await.unwrap().unwrap();
        assert_eq!(item.stock, -4);
    }

    #[tokio::test]
    async fn test_movement_for_unknown_item_rolls_back() {
        let db = test_db().await;
        let repo = db.inventory();

        let err = repo
            .record_movement(999, MovementKind::Entry, 1, "")
            .await
            .unwrap_err();
        // FK violation on insert, nothing persisted
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(repo.recent_movements(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_critical_items_ordering() {
        let db = test_db().await;
        let repo = db.inventory();

        let mk = |name: &str| ItemInput {
            name: name.to_string(),
            sku: None,
            cost_price_cents: 100,
            sale_price_cents: 150,
        };

        let low_b = repo.create_item(&mk("Bolsas")).await.unwrap();
        let low_a = repo.create_item(&mk("Aceite")).await.unwrap();
        let plenty = repo.create_item(&mk("Vasos")).await.unwrap();

        repo.record_movement(low_b.id, MovementKind::Entry, 2, "")
            .await
            .unwrap();
        repo.record_movement(low_a.id, MovementKind::Entry, 2, "")
            .await
            .unwrap();
        repo.record_movement(plenty.id, MovementKind::Entry, 50, "")
            .await
            .unwrap();

        let critical = repo.critical_items().await.unwrap();
        let names: Vec<&str> = critical.iter().map(|i| i.name.as_str()).collect();
        // Equal stock, alphabetical tiebreak; well-stocked item excluded
        assert_eq!(names, vec!["Aceite", "Bolsas"]);
    }

    #[tokio::test]
    async fn test_total_valuation() {
        let db = test_db().await;
        let repo = db.inventory();

        let item = repo.create_item(&napkins()).await.unwrap();
        repo.record_movement(item.id, MovementKind::Entry, 12, "")
            .await
            .unwrap();

        // 12 × 250 cents
        assert_eq!(repo.total_valuation().await.unwrap(), 3000);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = test_db().await;
        let repo = db.inventory();

        repo.create_item(&napkins()).await.unwrap();
        let err = repo.create_item(&napkins()).await.unwrap_err();
        assert!(err.is_unique_violation_on("inventory_items.sku"));
    }
}
