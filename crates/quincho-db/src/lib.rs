//! # quincho-db: Database Layer for Quincho POS
//!
//! This crate provides database access for the Quincho POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quincho POS Data Flow                             │
//! │                                                                         │
//! │  HTTP Handler (kitchen_board)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    quincho-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (order.rs...) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ CatalogRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ OrderRepo     │    │ ...          │  │   │
//! │  │   │ Management    │    │ ReceiptRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                  ./data/quincho.db (WAL)                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, order, receipt, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quincho_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/quincho.db");
//! let db = Database::new(config).await?;
//!
//! let board = db.orders().kitchen_board().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::{CatalogRepository, ProductInput, PromotionInput};
pub use repository::inventory::{InventoryRepository, ItemInput};
pub use repository::order::{NewOrder, NewOrderLine, OrderRepository};
pub use repository::receipt::ReceiptRepository;
pub use repository::report::{
    DailyMovementPoint, DailyPoint, ReportRepository, SalesFilter, SalesReport, SalesRow,
    SalesSummary,
};
pub use repository::session::SessionRepository;
pub use repository::user::{User, UserRepository};
