//! # HTTP Routes
//!
//! The full JSON API surface, one module per area:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /api/menu, /api/categories, /api/products, /api/promotions  catalog   │
//! │  /api/cart/:session/...                                      cart      │
//! │  /api/cart/:session/checkout                                 checkout  │
//! │  /api/register/sales, /api/orders/...                        register  │
//! │  /api/kitchen, /api/orders/:id/status|hide                   kitchen   │
//! │  /api/receipts, /api/orders/:id/receipt                      receipts  │
//! │  /api/inventory/...                                          inventory │
//! │  /api/reports/...                                            reports   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod inventory;
pub mod kitchen;
pub mod receipts;
pub mod register;
pub mod reports;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Catalog
        .route("/api/menu", get(catalog::menu))
        .route(
            "/api/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/api/categories/:id",
            put(catalog::update_category).delete(catalog::delete_category),
        )
        .route(
            "/api/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/api/products/:id",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/api/promotions",
            get(catalog::list_promotions).post(catalog::create_promotion),
        )
        .route("/api/promotions/:id", put(catalog::update_promotion))
        // Session cart
        .route("/api/sessions", post(cart::create_session))
        .route(
            "/api/cart/:session",
            get(cart::get_cart).delete(cart::clear_cart),
        )
        .route("/api/cart/:session/products/:id", post(cart::add_product))
        .route(
            "/api/cart/:session/promotions/:id",
            post(cart::add_promotion),
        )
        .route("/api/cart/:session/items/:key", delete(cart::remove_item))
        .route("/api/cart/:session/checkout", post(checkout::checkout))
        // Register and orders
        .route("/api/register/sales", post(register::register_sale))
        .route("/api/orders", get(register::list_orders))
        .route("/api/orders/:id", get(register::get_order))
        .route("/api/orders/:id/lines", post(register::add_line))
        .route(
            "/api/orders/:id/lines/:line_id",
            delete(register::delete_line),
        )
        .route(
            "/api/orders/:id/manual-total",
            put(register::update_manual_total),
        )
        // Kitchen
        .route("/api/kitchen", get(kitchen::board))
        .route("/api/orders/:id/status", post(kitchen::set_status))
        .route("/api/orders/:id/hide", post(kitchen::hide))
        // Receipts
        .route("/api/receipts", get(receipts::list_recent))
        .route("/api/receipts/:folio", get(receipts::get_by_folio))
        .route("/api/orders/:id/receipt", get(receipts::order_receipt))
        .route(
            "/api/orders/:id/receipt/print",
            get(receipts::print_receipt),
        )
        // Inventory
        .route("/api/inventory", get(inventory::dashboard))
        .route(
            "/api/inventory/items",
            get(inventory::list_items).post(inventory::create_item),
        )
        .route(
            "/api/inventory/items/:id",
            get(inventory::get_item)
                .put(inventory::update_item)
                .delete(inventory::delete_item),
        )
        .route(
            "/api/inventory/items/:id/movements",
            get(inventory::item_movements).post(inventory::record_movement),
        )
        .route(
            "/api/inventory/movements",
            get(inventory::recent_movements),
        )
        .route("/api/inventory/export", get(inventory::export_csv))
        // Reports
        .route("/api/reports/sales", get(reports::sales_history))
        .route("/api/reports/sales/export", get(reports::export_csv))
        .route("/api/reports/summary", get(reports::sales_summary))
        .route("/api/reports/daily-sales", get(reports::daily_sales))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let database = if state.db.health_check().await {
        "ok"
    } else {
        "unreachable"
    };
    Json(serde_json::json!({ "status": "ok", "database": database }))
}
