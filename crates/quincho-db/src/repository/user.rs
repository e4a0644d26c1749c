//! # User Repository
//!
//! Admin accounts for the back-office panels. Passwords are stored as
//! argon2 hashes; the plaintext never leaves this module's call frame.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};

/// An admin user row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user, hashing the password.
    pub async fn create(&self, username: &str, password: &str, is_admin: bool) -> DbResult<User> {
        let hash = hash_password(password)?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, is_admin, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, username, password_hash, is_admin, created_at",
        )
        .bind(username)
        .bind(hash)
        .bind(is_admin)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_admin, created_at
             FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Verifies a username/password pair.
    pub async fn verify(&self, username: &str, password: &str) -> DbResult<bool> {
        let Some(user) = self.find_by_username(username).await? else {
            return Ok(false);
        };
        Ok(verify_password(password, &user.password_hash))
    }

    /// Ensures a bootstrap admin account exists.
    ///
    /// Idempotent: an existing account with the same username is left
    /// untouched (including its password).
    pub async fn ensure_admin(&self, username: &str, password: &str) -> DbResult<()> {
        if self.find_by_username(username).await?.is_some() {
            return Ok(());
        }

        self.create(username, password, true).await?;
        info!(username, "Bootstrap admin account created");
        Ok(())
    }
}

/// Hashes a password with argon2 and a random salt.
fn hash_password(password: &str) -> DbResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::HashingFailed(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored argon2 hash.
fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_verify() {
        let db = test_db().await;
        let repo = db.users();

        let user = repo.create("admin", "hunter2", true).await.unwrap();
        assert!(user.is_admin);
        // Hash, not plaintext
        assert_ne!(user.password_hash, "hunter2");

        assert!(repo.verify("admin", "hunter2").await.unwrap());
        assert!(!repo.verify("admin", "wrong").await.unwrap());
        assert!(!repo.verify("ghost", "hunter2").await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let db = test_db().await;
        let repo = db.users();

        repo.ensure_admin("admin", "first").await.unwrap();
        repo.ensure_admin("admin", "second").await.unwrap();

        // The original password still works; the second call changed nothing
        assert!(repo.verify("admin", "first").await.unwrap());
        assert!(!repo.verify("admin", "second").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = test_db().await;
        let repo = db.users();

        repo.create("admin", "x", true).await.unwrap();
        let err = repo.create("admin", "y", false).await.unwrap_err();
        assert!(err.is_unique_violation_on("users.username"));
    }
}
