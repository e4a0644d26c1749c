//! # Repository Module
//!
//! Database repository implementations for Quincho POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP Handler                                                          │
//! │       │                                                                 │
//! │       │  db.orders().kitchen_board()                                    │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create(&self, new_order)                                          │
//! │  ├── set_status(&self, id, status)                                     │
//! │  ├── kitchen_board(&self)                                              │
//! │  └── lines(&self, order_id)                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory database per test)                          │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Categories, products, promotions
//! - [`order::OrderRepository`] - Orders, lines, kitchen workflow
//! - [`receipt::ReceiptRepository`] - Receipt emission with folio assignment
//! - [`inventory::InventoryRepository`] - Items and the movement ledger
//! - [`report::ReportRepository`] - Sales report and daily series
//! - [`session::SessionRepository`] - Web session cart storage
//! - [`user::UserRepository`] - Admin accounts

pub mod catalog;
pub mod inventory;
pub mod order;
pub mod receipt;
pub mod report;
pub mod session;
pub mod user;
