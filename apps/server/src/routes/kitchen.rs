//! Kitchen display handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use quincho_core::{Order, OrderLine, OrderStatus};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BoardEntry {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// GET /api/kitchen — visible pending/in_kitchen orders with their lines,
/// oldest first.
pub async fn board(State(app): State<AppState>) -> Result<Json<Vec<BoardEntry>>, ApiError> {
    let orders = app.db.orders().kitchen_board().await?;
    let mut entries = Vec::with_capacity(orders.len());
    for order in orders {
        let lines = app.db.orders().lines(order.id).await?;
        entries.push(BoardEntry { order, lines });
    }
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// POST /api/orders/:id/status — write a status; visibility is re-derived.
///
/// Any status may be set at any time. Serde rejects unknown status strings
/// before the handler runs.
pub async fn set_status(
    State(app): State<AppState>,
    Path(order_id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Order>, ApiError> {
    app.db.orders().set_status(order_id, req.status).await?;
    info!(order_id, status = req.status.as_str(), "Order status updated");

    app.db
        .orders()
        .get(order_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order", order_id))
}

/// POST /api/orders/:id/hide — take an order off the board without touching
/// its status.
pub async fn hide(
    State(app): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    app.db.orders().hide(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
