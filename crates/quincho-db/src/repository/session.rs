//! # Session Repository
//!
//! Server-side web session storage. Each session row holds the raw cart
//! JSON exactly as the handlers last wrote it; decoding tolerance lives in
//! `quincho_core::cart`, not here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::DbResult;
use quincho_core::RawCart;

/// Repository for session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Loads the raw cart for a session.
    ///
    /// A missing session or undecodable JSON yields an empty cart; the
    /// session is never an error source for the shopper.
    pub async fn load_cart(&self, session_id: &str) -> DbResult<RawCart> {
        let json: Option<String> =
            sqlx::query_scalar("SELECT cart_json FROM sessions WHERE id = ?1")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(json) = json else {
            return Ok(RawCart::new());
        };

        match serde_json::from_str(&json) {
            Ok(cart) => Ok(cart),
            Err(err) => {
                warn!(session_id, %err, "Discarding undecodable session cart");
                Ok(RawCart::new())
            }
        }
    }

    /// Saves the raw cart for a session (upsert).
    pub async fn save_cart(&self, session_id: &str, cart: &RawCart) -> DbResult<()> {
        let json = serde_json::to_string(cart)
            .unwrap_or_else(|_| "{}".to_string());
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO sessions (id, cart_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET cart_json = excluded.cart_json,
                                           updated_at = excluded.updated_at",
        )
        .bind(session_id)
        .bind(json)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Empties a session's cart (checkout completion).
    pub async fn clear_cart(&self, session_id: &str) -> DbResult<()> {
        self.save_cart(session_id, &RawCart::new()).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use quincho_core::RawCartEntry;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_missing_session_yields_empty_cart() {
        let db = test_db().await;
        let cart = db.sessions().load_cart("nope").await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_cart_round_trip() {
        let db = test_db().await;
        let repo = db.sessions();

        let mut cart = RawCart::new();
        cart.insert("12".to_string(), RawCartEntry::Quantity(2));
        repo.save_cart("abc", &cart).await.unwrap();

        let loaded = repo.load_cart("abc").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(matches!(loaded["12"], RawCartEntry::Quantity(2)));

        repo.clear_cart("abc").await.unwrap();
        assert!(repo.load_cart("abc").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_json_discarded() {
        let db = test_db().await;

        sqlx::query("INSERT INTO sessions (id, cart_json, updated_at) VALUES ('bad', '{', ?1)")
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();

        let cart = db.sessions().load_cart("bad").await.unwrap();
        assert!(cart.is_empty());
    }
}
