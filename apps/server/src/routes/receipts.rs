//! Receipt handlers: emission, lookup, and the printable ticket.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use quincho_core::Receipt;

use crate::error::ApiError;
use crate::export::receipt_text;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/receipts — most recent receipts, newest folio first.
pub async fn list_recent(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Receipt>>, ApiError> {
    Ok(Json(app.db.receipts().list_recent(query.limit).await?))
}

/// GET /api/receipts/:folio
pub async fn get_by_folio(
    State(app): State<AppState>,
    Path(folio): Path<i64>,
) -> Result<Json<Receipt>, ApiError> {
    Ok(Json(app.db.receipts().get_by_folio(folio).await?))
}

/// Loads or lazily emits the receipt for an order.
///
/// The first view of a web order's receipt emits it with the order's own
/// payment method, falling back to the label "manual" when the order never
/// recorded one.
async fn receipt_for_order(app: &AppState, order_id: i64) -> Result<Receipt, ApiError> {
    let order = app
        .db
        .orders()
        .get(order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", order_id))?;

    let total = app.db.orders().total(order_id).await?;
    let method = order
        .payment_method
        .map(|m| m.as_str())
        .unwrap_or("manual");

    Ok(app
        .db
        .receipts()
        .get_or_emit(order_id, total.cents(), method)
        .await?)
}

/// GET /api/orders/:id/receipt — the order's receipt, emitted on first view.
pub async fn order_receipt(
    State(app): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<Receipt>, ApiError> {
    Ok(Json(receipt_for_order(&app, order_id).await?))
}

/// GET /api/orders/:id/receipt/print — printable plain-text ticket.
pub async fn print_receipt(
    State(app): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = receipt_for_order(&app, order_id).await?;
    let order = app
        .db
        .orders()
        .get(order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", order_id))?;
    let lines = app.db.orders().lines(order_id).await?;

    let body = receipt_text(&receipt, &order, &lines);
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    ))
}
