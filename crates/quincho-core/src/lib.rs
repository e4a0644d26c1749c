//! # quincho-core: Pure Business Logic for Quincho POS
//!
//! This crate is the **heart** of Quincho POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quincho POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP Clients                                 │   │
//! │  │   Public Menu ── Cart ── Checkout ── Register ── Kitchen       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ axum routes                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    server (HTTP layer)                          │   │
//! │  │   handlers, CSV export, payment gateway, WhatsApp links        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ quincho-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   error   │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ CoreError │  │   │
//! │  │   │   Order   │  │  parsing  │  │ normalize │  │ Validation│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  quincho-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Receipt, inventory ledger)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Session cart normalization and manipulation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use quincho_core::money::Money;
//! use quincho_core::types::{order_total, OrderLine};
//!
//! // Create money from cents (never from floats!)
//! let manual = Money::from_cents(1_500_000);
//!
//! // With no lines the register's manual total stands in
//! assert_eq!(order_total(&[], manual), manual);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use quincho_core::Money` instead of
// `use quincho_core::money::Money`

pub use cart::{Cart, CartItem, CartLine, NormalizeOutcome, RawCart, RawCartEntry};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Offset separating promotion ids from product ids inside cart keys.
///
/// ## Why an offset?
/// The session cart keys everything by a single numeric id. Promotions live
/// in their own table with their own id sequence, so cart key `"1000003"`
/// means promotion 3 while `"3"` means product 3. The offset is large enough
/// that the two ranges cannot realistically collide.
pub const PROMO_ID_OFFSET: i64 = 1_000_000;

/// Stock level at or below which an inventory item counts as critical.
pub const CRITICAL_STOCK_THRESHOLD: i64 = 10;

/// Length of the trailing daily-sales window on the inventory dashboard.
pub const TRAILING_DAYS: i64 = 7;
