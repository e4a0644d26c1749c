//! Public menu and catalog administration handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use quincho_core::{Category, Product, Promotion};
use quincho_db::{ProductInput, PromotionInput};

use crate::error::ApiError;
use crate::state::AppState;

/// One section of the public menu: a category and its active products.
#[derive(Debug, Serialize)]
pub struct MenuSection {
    pub category: Category,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub sections: Vec<MenuSection>,
    /// Active products without a category (their category was deleted).
    pub uncategorized: Vec<Product>,
    pub promotions: Vec<Promotion>,
}

/// GET /api/menu — the public menu: active categories with their active
/// products, detached products, and active promotions.
pub async fn menu(State(app): State<AppState>) -> Result<Json<MenuResponse>, ApiError> {
    let catalog = app.db.catalog();

    let categories = catalog.list_categories(true).await?;
    let mut sections = Vec::with_capacity(categories.len());
    for category in categories {
        let products = catalog.products_by_category(category.id).await?;
        sections.push(MenuSection { category, products });
    }

    let uncategorized = catalog
        .list_products(true)
        .await?
        .into_iter()
        .filter(|p| p.category_id.is_none())
        .collect();

    let promotions = catalog.list_promotions(true).await?;

    Ok(Json(MenuResponse {
        sections,
        uncategorized,
        promotions,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Include inactive entries (admin views).
    #[serde(default)]
    pub all: bool,
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

pub async fn list_categories(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(app.db.catalog().list_categories(!query.all).await?))
}

pub async fn create_category(
    State(app): State<AppState>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    let category = app
        .db
        .catalog()
        .create_category(req.name.trim(), &req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let catalog = app.db.catalog();
    catalog
        .update_category(id, req.name.trim(), &req.description, req.active)
        .await?;
    catalog
        .get_category(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category", id))
}

pub async fn delete_category(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    app.db.catalog().delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub category_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl ProductRequest {
    fn validate(&self) -> Result<ProductInput, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::validation("name is required"));
        }
        if self.price_cents < 0 {
            return Err(ApiError::validation("price_cents must not be negative"));
        }
        Ok(ProductInput {
            category_id: self.category_id,
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            price_cents: self.price_cents,
            active: self.active,
        })
    }
}

pub async fn list_products(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(app.db.catalog().list_products(!query.all).await?))
}

pub async fn get_product(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    app.db
        .catalog()
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", id))
}

pub async fn create_product(
    State(app): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let input = req.validate()?;
    let product = app.db.catalog().create_product(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let input = req.validate()?;
    let catalog = app.db.catalog();
    catalog.update_product(id, &input).await?;
    catalog
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", id))
}

/// DELETE /api/products/:id — hard delete; falls back to deactivation when
/// historical order lines still reference the product.
pub async fn delete_product(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let catalog = app.db.catalog();
    match catalog.delete_product(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) if matches!(err, quincho_db::DbError::ForeignKeyViolation { .. }) => {
            tracing::info!(product_id = id, "Product still referenced, deactivating instead");
            catalog.deactivate_product(id).await?;
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// Promotions
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PromotionRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl PromotionRequest {
    fn validate(&self) -> Result<PromotionInput, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::validation("name is required"));
        }
        if self.price_cents < 0 {
            return Err(ApiError::validation("price_cents must not be negative"));
        }
        Ok(PromotionInput {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            price_cents: self.price_cents,
            active: self.active,
        })
    }
}

pub async fn list_promotions(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Promotion>>, ApiError> {
    Ok(Json(app.db.catalog().list_promotions(!query.all).await?))
}

pub async fn create_promotion(
    State(app): State<AppState>,
    Json(req): Json<PromotionRequest>,
) -> Result<(StatusCode, Json<Promotion>), ApiError> {
    let input = req.validate()?;
    let promotion = app.db.catalog().create_promotion(&input).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

pub async fn update_promotion(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<PromotionRequest>,
) -> Result<Json<Promotion>, ApiError> {
    let input = req.validate()?;
    let catalog = app.db.catalog();
    catalog.update_promotion(id, &input).await?;
    catalog
        .get_promotion(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Promotion", id))
}
