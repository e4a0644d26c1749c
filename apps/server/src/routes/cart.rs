//! Session cart handlers.
//!
//! Carts live as JSON blobs keyed by session id. Every read goes through
//! [`load_normalized`], which resolves legacy quantity-only entries against
//! the live catalog and silently drops whatever no longer resolves, so stale
//! or hand-mangled carts never break a request.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use quincho_core::cart::{normalize, unresolved_ids, Cart, CartItem};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
}

/// POST /api/sessions — mint a fresh session id for a new cart.
pub async fn create_session() -> Json<SessionResponse> {
    Json(SessionResponse {
        session_id: uuid::Uuid::new_v4().to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub total_cents: i64,
    pub total: String,
    /// Cart keys that referenced products no longer in the catalog.
    pub dropped: Vec<String>,
}

impl CartResponse {
    fn from_cart(cart: &Cart, dropped: Vec<String>) -> Self {
        let (items, total) = cart.items();
        CartResponse {
            items,
            total_cents: total.cents(),
            total: total.to_string(),
            dropped,
        }
    }
}

/// Loads a session cart, normalizes it against the live catalog, and writes
/// the normalized form back so the next read starts clean.
pub async fn load_normalized(
    app: &AppState,
    session_id: &str,
) -> Result<(Cart, Vec<String>), ApiError> {
    let raw = app.db.sessions().load_cart(session_id).await?;

    let ids = unresolved_ids(&raw);
    let catalog = app.db.catalog().resolve_for_cart(&ids).await?;

    let outcome = normalize(&raw, &catalog);
    if !outcome.dropped.is_empty() {
        tracing::warn!(
            session = session_id,
            dropped = ?outcome.dropped,
            "Dropped unresolvable cart entries"
        );
    }

    app.db
        .sessions()
        .save_cart(session_id, &outcome.cart.to_raw())
        .await?;

    Ok((outcome.cart, outcome.dropped))
}

/// GET /api/cart/:session
pub async fn get_cart(
    State(app): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let (cart, dropped) = load_normalized(&app, &session_id).await?;
    Ok(Json(CartResponse::from_cart(&cart, dropped)))
}

/// POST /api/cart/:session/products/:id — add one unit of a product.
pub async fn add_product(
    State(app): State<AppState>,
    Path((session_id, product_id)): Path<(String, i64)>,
) -> Result<Json<CartResponse>, ApiError> {
    let product = app
        .db
        .catalog()
        .get_product(product_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    let (mut cart, dropped) = load_normalized(&app, &session_id).await?;
    cart.add_product(&product);
    app.db
        .sessions()
        .save_cart(&session_id, &cart.to_raw())
        .await?;

    Ok(Json(CartResponse::from_cart(&cart, dropped)))
}

/// POST /api/cart/:session/promotions/:id — add one unit of a promotion.
pub async fn add_promotion(
    State(app): State<AppState>,
    Path((session_id, promo_id)): Path<(String, i64)>,
) -> Result<Json<CartResponse>, ApiError> {
    let promo = app
        .db
        .catalog()
        .get_promotion(promo_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| ApiError::not_found("Promotion", promo_id))?;

    let (mut cart, dropped) = load_normalized(&app, &session_id).await?;
    cart.add_promotion(&promo);
    app.db
        .sessions()
        .save_cart(&session_id, &cart.to_raw())
        .await?;

    Ok(Json(CartResponse::from_cart(&cart, dropped)))
}

/// DELETE /api/cart/:session/items/:key — remove a whole line.
pub async fn remove_item(
    State(app): State<AppState>,
    Path((session_id, key)): Path<(String, String)>,
) -> Result<Json<CartResponse>, ApiError> {
    let (mut cart, dropped) = load_normalized(&app, &session_id).await?;
    cart.remove(&key);
    app.db
        .sessions()
        .save_cart(&session_id, &cart.to_raw())
        .await?;

    Ok(Json(CartResponse::from_cart(&cart, dropped)))
}

/// DELETE /api/cart/:session — empty the cart.
pub async fn clear_cart(
    State(app): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app.db.sessions().clear_cart(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
