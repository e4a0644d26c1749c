//! Presential register ("caja") handlers.
//!
//! A register sale is entered by a cashier: customer fields plus a free-form
//! total. The amount string is coerced, never rejected — a typo becomes a
//! zero-total order the cashier can fix, not a lost sale.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use quincho_core::{Money, Order, OrderLine, PaymentMethod};
use quincho_db::{NewOrder, NewOrderLine};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterSaleRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Free-form decimal amount ("15000", "99.90"). Unparseable coerces to 0.
    #[serde(default)]
    pub amount: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterSaleResponse {
    pub order: Order,
    pub folio: i64,
    pub total_cents: i64,
    pub total: String,
}

/// POST /api/register/sales — record a counter sale and emit its receipt.
///
/// Register sales are paid on the spot, so the receipt is emitted eagerly
/// in the same request.
pub async fn register_sale(
    State(app): State<AppState>,
    Json(req): Json<RegisterSaleRequest>,
) -> Result<(StatusCode, Json<RegisterSaleResponse>), ApiError> {
    let total = Money::parse(&req.amount).unwrap_or_else(Money::zero);

    let mut new = NewOrder::counter(total.cents());
    new.customer_name = req.customer_name.filter(|n| !n.trim().is_empty());
    new.customer_phone = req.customer_phone;
    new.payment_method = Some(req.payment_method);
    new.note = req.note;

    let order = app.db.orders().create(&new).await?;
    let receipt = app
        .db
        .receipts()
        .emit(order.id, total.cents(), req.payment_method.as_str())
        .await?;

    info!(order_id = order.id, folio = receipt.folio, total = %total, "Register sale recorded");

    Ok((
        StatusCode::CREATED,
        Json(RegisterSaleResponse {
            order,
            folio: receipt.folio,
            total_cents: total.cents(),
            total: total.to_string(),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub total_cents: i64,
    pub total: String,
}

async fn order_detail(app: &AppState, order_id: i64) -> Result<OrderDetail, ApiError> {
    let order = app
        .db
        .orders()
        .get(order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", order_id))?;
    let lines = app.db.orders().lines(order_id).await?;
    let total = app.db.orders().total(order_id).await?;
    Ok(OrderDetail {
        order,
        lines,
        total_cents: total.cents(),
        total: total.to_string(),
    })
}

/// GET /api/orders/:id — order with lines and derived total.
pub async fn get_order(
    State(app): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderDetail>, ApiError> {
    Ok(Json(order_detail(&app, order_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/orders — most recent orders, newest first.
pub async fn list_orders(
    State(app): State<AppState>,
    axum::extract::Query(query): axum::extract::Query<ListQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(app.db.orders().list_recent(query.limit).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// POST /api/orders/:id/lines — append a snapshot line to an open order.
pub async fn add_line(
    State(app): State<AppState>,
    Path(order_id): Path<i64>,
    Json(req): Json<AddLineRequest>,
) -> Result<Json<OrderDetail>, ApiError> {
    if req.quantity <= 0 {
        return Err(ApiError::validation("quantity must be positive"));
    }

    app.db
        .orders()
        .get(order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", order_id))?;
    let product = app
        .db
        .catalog()
        .get_product(req.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", req.product_id))?;

    app.db
        .orders()
        .add_line(
            order_id,
            &NewOrderLine {
                product_id: Some(product.id),
                product_name: product.name.clone(),
                quantity: req.quantity,
                unit_price_cents: product.price_cents,
            },
        )
        .await?;

    Ok(Json(order_detail(&app, order_id).await?))
}

/// DELETE /api/orders/:id/lines/:line_id
pub async fn delete_line(
    State(app): State<AppState>,
    Path((order_id, line_id)): Path<(i64, i64)>,
) -> Result<Json<OrderDetail>, ApiError> {
    app.db.orders().delete_line(line_id).await?;
    Ok(Json(order_detail(&app, order_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ManualTotalRequest {
    /// Free-form decimal amount; unparseable coerces to 0.
    pub amount: String,
}

/// PUT /api/orders/:id/manual-total
pub async fn update_manual_total(
    State(app): State<AppState>,
    Path(order_id): Path<i64>,
    Json(req): Json<ManualTotalRequest>,
) -> Result<Json<OrderDetail>, ApiError> {
    let total = Money::parse(&req.amount).unwrap_or_else(Money::zero);
    app.db
        .orders()
        .update_manual_total(order_id, total.cents())
        .await?;
    Ok(Json(order_detail(&app, order_id).await?))
}
