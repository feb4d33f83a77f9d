//! # User Repository
//!
//! Accounts and the credentials used at login. Emails are stored trimmed and
//! lowercased; the column is also `COLLATE NOCASE` so uniqueness never
//! depends on case.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ecofinds_core::{CoreError, User};

/// A user together with their stored password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an account.
    ///
    /// `password_hash` must already be a PHC string; hashing happens in the
    /// API layer. A taken email fails with Conflict.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: normalize_email(email),
            name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            created_at: Utc::now(),
        };

        debug!(id = %user.id, email = %user.email, "Creating user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(err) => match DbError::from(err) {
                e if e.is_unique_violation_on("users.email") => {
                    Err(CoreError::conflict("Email is already registered").into())
                }
                e => Err(e),
            },
        }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Looks up the login record for an email (case-insensitive).
    pub async fn find_credentials(&self, email: &str) -> DbResult<Option<UserCredentials>> {
        let creds = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id, email, name, created_at, password_hash
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(creds)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
