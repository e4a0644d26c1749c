//! # Catalog Repository
//!
//! Database operations for categories, products, and promotions.
//!
//! ## Soft Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Deactivate vs Delete                                 │
//! │                                                                         │
//! │  Deactivate (active = 0)        Hard delete (DELETE FROM)              │
//! │  ─────────────────────────      ──────────────────────────             │
//! │  • Product hidden from menu     • Fails with FK RESTRICT if any        │
//! │  • History stays intact           order line references the product    │
//! │  • Always succeeds              • Only possible for never-sold rows    │
//! │                                                                         │
//! │  Categories are different: deleting one detaches its products          │
//! │  (ON DELETE SET NULL) instead of deleting them.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use quincho_core::cart::CatalogEntry;
use quincho_core::{Category, Product, Promotion};

/// Input for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub category_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub active: bool,
}

/// Input for creating or updating a promotion.
#[derive(Debug, Clone)]
pub struct PromotionInput {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub active: bool,
}

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Lists categories, optionally restricted to active ones.
    pub async fn list_categories(&self, active_only: bool) -> DbResult<Vec<Category>> {
        let sql = if active_only {
            "SELECT id, name, description, active FROM categories WHERE active = 1 ORDER BY name"
        } else {
            "SELECT id, name, description, active FROM categories ORDER BY name"
        };
        let categories = sqlx::query_as::<_, Category>(sql).fetch_all(&self.pool).await?;
        Ok(categories)
    }

    pub async fn get_category(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, active FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn create_category(&self, name: &str, description: &str) -> DbResult<Category> {
        debug!(name = %name, "Creating category");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (name, description) VALUES (?1, ?2) RETURNING id",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(Category {
            id,
            name: name.to_string(),
            description: description.to_string(),
            active: true,
        })
    }

    pub async fn update_category(
        &self,
        id: i64,
        name: &str,
        description: &str,
        active: bool,
    ) -> DbResult<()> {
        sqlx::query(
            "UPDATE categories SET name = ?2, description = ?3, active = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes a category. Its products stay, detached (category_id → NULL).
    pub async fn delete_category(&self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Lists products, optionally restricted to active ones.
    pub async fn list_products(&self, active_only: bool) -> DbResult<Vec<Product>> {
        let sql = if active_only {
            "SELECT id, category_id, name, description, price_cents, active
             FROM products WHERE active = 1 ORDER BY name"
        } else {
            "SELECT id, category_id, name, description, price_cents, active
             FROM products ORDER BY name"
        };
        let products = sqlx::query_as::<_, Product>(sql).fetch_all(&self.pool).await?;
        Ok(products)
    }

    /// Active products of one category, for the public menu.
    pub async fn products_by_category(&self, category_id: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, category_id, name, description, price_cents, active
             FROM products WHERE category_id = ?1 AND active = 1 ORDER BY name",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn get_product(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, category_id, name, description, price_cents, active
             FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Resolves a batch of product ids into cart catalog entries.
    ///
    /// Used by cart normalization: ids that miss (deleted, deactivated or
    /// promotion-offset) are simply absent from the map.
    pub async fn resolve_for_cart(&self, ids: &[i64]) -> DbResult<HashMap<i64, CatalogEntry>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder = sqlx::QueryBuilder::new(
            "SELECT id, name, price_cents FROM products WHERE active = 1 AND id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(i64, String, i64)> =
            builder.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, price_cents)| (id, CatalogEntry { name, price_cents }))
            .collect())
    }

    pub async fn create_product(&self, input: &ProductInput) -> DbResult<Product> {
        debug!(name = %input.name, "Creating product");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (category_id, name, description, price_cents, active)
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
        )
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(Product {
            id,
            category_id: input.category_id,
            name: input.name.clone(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            active: input.active,
        })
    }

    pub async fn update_product(&self, id: i64, input: &ProductInput) -> DbResult<()> {
        sqlx::query(
            "UPDATE products SET category_id = ?2, name = ?3, description = ?4,
             price_cents = ?5, active = ?6 WHERE id = ?1",
        )
        .bind(id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Soft-deletes a product by deactivating it.
    pub async fn deactivate_product(&self, id: i64) -> DbResult<()> {
        sqlx::query("UPDATE products SET active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Hard-deletes a product.
    ///
    /// Fails with a foreign-key violation when order lines reference it;
    /// callers should fall back to [`Self::deactivate_product`].
    pub async fn delete_product(&self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Promotions
    // =========================================================================

    pub async fn list_promotions(&self, active_only: bool) -> DbResult<Vec<Promotion>> {
        let sql = if active_only {
            "SELECT id, name, description, price_cents, active
             FROM promotions WHERE active = 1 ORDER BY name"
        } else {
            "SELECT id, name, description, price_cents, active FROM promotions ORDER BY name"
        };
        let promotions = sqlx::query_as::<_, Promotion>(sql).fetch_all(&self.pool).await?;
        Ok(promotions)
    }

    pub async fn get_promotion(&self, id: i64) -> DbResult<Option<Promotion>> {
        let promotion = sqlx::query_as::<_, Promotion>(
            "SELECT id, name, description, price_cents, active FROM promotions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(promotion)
    }

    pub async fn create_promotion(&self, input: &PromotionInput) -> DbResult<Promotion> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO promotions (name, description, price_cents, active)
             VALUES (?1, ?2, ?3, ?4) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(Promotion {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            active: input.active,
        })
    }

    pub async fn update_promotion(&self, id: i64, input: &PromotionInput) -> DbResult<()> {
        sqlx::query(
            "UPDATE promotions SET name = ?2, description = ?3, price_cents = ?4, active = ?5
             WHERE id = ?1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.active)
        .execute(&self.pool)
        .await?;
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

    fn completo(category_id: Option<i64>) -> ProductInput {
        ProductInput {
            category_id,
            name: "Completo Italiano".to_string(),
            description: "Palta, tomate, mayo".to_string(),
            price_cents: 350_000,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_product_crud() {
        let db = test_db().await;
        let repo = db.catalog();

        let cat = repo.create_category("Completos", "").await.unwrap();
        let product = repo.create_product(&completo(Some(cat.id))).await.unwrap();

        let fetched = repo.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Completo Italiano");
        assert_eq!(fetched.price_cents, 350_000);
        assert_eq!(fetched.category_id, Some(cat.id));

        repo.deactivate_product(product.id).await.unwrap();
        assert!(repo.list_products(true).await.unwrap().is_empty());
        assert_eq!(repo.list_products(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_category_delete_detaches_products() {
        let db = test_db().await;
        let repo = db.catalog();

        let cat = repo.create_category("Bebidas", "").await.unwrap();
        let product = repo.create_product(&completo(Some(cat.id))).await.unwrap();

        repo.delete_category(cat.id).await.unwrap();

        let fetched = repo.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(fetched.category_id, None);
    }

    #[tokio::test]
    async fn test_duplicate_category_name_rejected() {
        let db = test_db().await;
        let repo = db.catalog();

        repo.create_category("Completos", "").await.unwrap();
        let err = repo.create_category("Completos", "").await.unwrap_err();
        assert!(err.is_unique_violation_on("categories.name"));
    }

    #[tokio::test]
    async fn test_resolve_for_cart_skips_inactive_and_missing() {
        let db = test_db().await;
        let repo = db.catalog();

        let active = repo.create_product(&completo(None)).await.unwrap();
        let hidden = repo.create_product(&completo(None)).await.unwrap();
        repo.deactivate_product(hidden.id).await.unwrap();

        let map = repo
            .resolve_for_cart(&[active.id, hidden.id, 9999])
            .await
            .unwrap();

        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&active.id));
    }
}
