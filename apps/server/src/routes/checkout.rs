//! Web checkout: turn a session cart into an order.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use quincho_core::{CoreError, DeliveryType, OrderOrigin, PaymentMethod, PROMO_ID_OFFSET};
use quincho_db::{NewOrder, NewOrderLine};

use crate::error::ApiError;
use crate::routes::cart::load_normalized;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub delivery_type: Option<DeliveryType>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: i64,
    pub total_cents: i64,
    pub total: String,
    /// Cart entries that could not be turned into order lines.
    pub skipped: Vec<String>,
    /// Messaging deep link for forwarding the order, when configured.
    pub whatsapp_link: Option<String>,
    /// Payment redirect URL, when the gateway is configured and reachable.
    pub payment_link: Option<String>,
}

/// POST /api/cart/:session/checkout
///
/// Freezes the cart into an order in one transaction: one line per cart item
/// whose product still exists in the catalog, name and price re-snapshotted
/// at insert time. Promotion entries and vanished products are skipped and
/// reported back rather than failing the order. Gateways run after the
/// order is committed and can only add links, never fail it.
pub async fn checkout(
    State(app): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    if req.customer_name.trim().is_empty() {
        return Err(ApiError::validation("customer_name is required"));
    }

    let (cart, mut skipped) = load_normalized(&app, &session_id).await?;
    let (items, _) = cart.items();
    if items.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    // Re-snapshot product lines from the live catalog at freeze time.
    let product_ids: Vec<i64> = items
        .iter()
        .filter(|i| i.id < PROMO_ID_OFFSET)
        .map(|i| i.id)
        .collect();
    let catalog = app.db.catalog().resolve_for_cart(&product_ids).await?;

    let mut lines = Vec::with_capacity(items.len());
    for item in &items {
        if item.is_promotion() {
            skipped.push(item.id.to_string());
            continue;
        }
        match catalog.get(&item.id) {
            Some(entry) => lines.push(NewOrderLine {
                product_id: Some(item.id),
                product_name: entry.name.clone(),
                quantity: item.quantity,
                unit_price_cents: entry.price_cents,
            }),
            None => {
                warn!(product_id = item.id, "Product vanished before checkout, skipping line");
                skipped.push(item.id.to_string());
            }
        }
    }

    let order = app
        .db
        .orders()
        .create(&NewOrder {
            origin: OrderOrigin::Web,
            channel: "web".to_string(),
            customer_name: Some(req.customer_name.trim().to_string()),
            customer_phone: req.customer_phone,
            customer_address: req.customer_address,
            payment_method: req.payment_method,
            delivery_type: req.delivery_type,
            manual_total_cents: 0,
            note: req.note,
            lines,
        })
        .await?;

    app.db.sessions().clear_cart(&session_id).await?;

    let total = app.db.orders().total(order.id).await?;
    info!(order_id = order.id, total = %total, "Web order placed");

    let whatsapp_link = app
        .messaging
        .order_link(order.id, &req.customer_name, &items, total);
    let payment_link = app.payment.checkout_link(order.id, total).await;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id: order.id,
            total_cents: total.cents(),
            total: total.to_string(),
            skipped,
            whatsapp_link,
            payment_link,
        }),
    ))
}
