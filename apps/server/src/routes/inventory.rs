//! Inventory handlers: items, the movement ledger, dashboard, CSV export.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use quincho_core::{InventoryItem, InventoryMovement, Money, MovementKind};
use quincho_db::{DailyMovementPoint, ItemInput};

use crate::error::ApiError;
use crate::export::inventory_csv;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub items: Vec<InventoryItem>,
    pub critical: Vec<InventoryItem>,
    pub valuation_cents: i64,
    pub valuation: String,
    pub daily_movements: Vec<DailyMovementPoint>,
}

/// GET /api/inventory — the inventory dashboard in one payload.
pub async fn dashboard(State(app): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    let inventory = app.db.inventory();

    let items = inventory.list_items().await?;
    let critical = inventory.critical_items().await?;
    let valuation_cents = inventory.total_valuation().await?;
    let daily_movements = app.db.reports().daily_movements().await?;

    Ok(Json(DashboardResponse {
        items,
        critical,
        valuation_cents,
        valuation: Money::from_cents(valuation_cents).to_string(),
        daily_movements,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub cost_price_cents: i64,
    pub sale_price_cents: i64,
}

impl ItemRequest {
    fn validate(&self) -> Result<ItemInput, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::validation("name is required"));
        }
        if self.cost_price_cents < 0 || self.sale_price_cents < 0 {
            return Err(ApiError::validation("prices must not be negative"));
        }
        Ok(ItemInput {
            name: self.name.trim().to_string(),
            sku: self.sku.clone().filter(|s| !s.trim().is_empty()),
            cost_price_cents: self.cost_price_cents,
            sale_price_cents: self.sale_price_cents,
        })
    }
}

pub async fn list_items(
    State(app): State<AppState>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    Ok(Json(app.db.inventory().list_items().await?))
}

pub async fn get_item(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InventoryItem>, ApiError> {
    app.db
        .inventory()
        .get_item(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Inventory item", id))
}

pub async fn create_item(
    State(app): State<AppState>,
    Json(req): Json<ItemRequest>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    let input = req.validate()?;
    let item = app.db.inventory().create_item(&input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/inventory/items/:id — update item metadata. Stock is not
/// editable here: it only ever changes through recorded movements.
pub async fn update_item(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ItemRequest>,
) -> Result<Json<InventoryItem>, ApiError> {
    let input = req.validate()?;
    let inventory = app.db.inventory();
    inventory.update_item(id, &input).await?;
    inventory
        .get_item(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Inventory item", id))
}

pub async fn delete_item(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    app.db.inventory().delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub kind: MovementKind,
    pub quantity: i64,
    #[serde(default)]
    pub reason: String,
}

/// POST /api/inventory/items/:id/movements — append to the ledger and
/// adjust stock in one transaction.
pub async fn record_movement(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<MovementRequest>,
) -> Result<(StatusCode, Json<InventoryMovement>), ApiError> {
    if req.quantity <= 0 {
        return Err(ApiError::validation("quantity must be positive"));
    }

    let movement = app
        .db
        .inventory()
        .record_movement(id, req.kind, req.quantity, &req.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    #[serde(default = "default_movement_limit")]
    pub limit: i64,
}

fn default_movement_limit() -> i64 {
    100
}

/// GET /api/inventory/items/:id/movements — the item's ledger, newest first.
pub async fn item_movements(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<MovementQuery>,
) -> Result<Json<Vec<InventoryMovement>>, ApiError> {
    app.db
        .inventory()
        .get_item(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Inventory item", id))?;
    Ok(Json(app.db.inventory().movements(id, query.limit).await?))
}

#[derive(Debug, Deserialize)]
pub struct RecentMovementQuery {
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

fn default_recent_limit() -> i64 {
    200
}

/// GET /api/inventory/movements — recent movements across all items.
pub async fn recent_movements(
    State(app): State<AppState>,
    Query(query): Query<RecentMovementQuery>,
) -> Result<Json<Vec<InventoryMovement>>, ApiError> {
    Ok(Json(
        app.db.inventory().recent_movements(query.limit).await?,
    ))
}

/// GET /api/inventory/export — the item list as a semicolon CSV download.
pub async fn export_csv(State(app): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = app.db.inventory().list_items().await?;
    let csv = inventory_csv(&items).map_err(|e| ApiError::internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventory.csv\"".to_string(),
            ),
        ],
        csv,
    ))
}
