//! # Profile Repository
//!
//! A profile is the user row plus an optional `profiles` row holding the
//! public username, phone and address. The profile row is created lazily the
//! first time one of those fields is edited.
//!
//! ```text
//! users (id, email, name)  1 ──── 0..1  profiles (user_id, username, phone, address)
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ecofinds_core::rules::validate_profile_update;
use ecofinds_core::{CoreError, Patch, Profile, ProfileUpdate};

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    username: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

/// Trims a nullable text patch; a blank value clears the field.
fn normalize(patch: Patch<String>) -> Patch<String> {
    match patch.map(|v| v.trim().to_string()) {
        Patch::Value(v) if v.is_empty() => Patch::Null,
        other => other,
    }
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Returns the profile for `user_id`. Fields of a profile row that does
    /// not exist yet come back as `null`.
    pub async fn get(&self, user_id: &str) -> DbResult<Profile> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT u.id, u.email, u.name, p.username, p.phone, p.address
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE u.id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user_id).into())
    }

    /// Applies a partial edit to the actor's own profile.
    ///
    /// ## Steps (one transaction)
    /// 1. `name` is written to the user row when supplied
    /// 2. The profile row is upserted (takes the write lock if step 1 did not)
    /// 3. The row is re-read, patched and written back
    ///
    /// A username taken by someone else fails with Conflict.
    pub async fn update(&self, user_id: &str, update: ProfileUpdate) -> DbResult<Profile> {
        validate_profile_update(&update)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        if !update.name.is_absent() {
            let name = match normalize(update.name.clone()) {
                Patch::Value(v) => Some(v),
                _ => None,
            };
            let result = sqlx::query("UPDATE users SET name = ?1 WHERE id = ?2")
                .bind(name)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(CoreError::not_found("User", user_id).into());
            }
        }

        if update.touches_profile_row() {
            let ensured = sqlx::query(
                r#"
                INSERT INTO profiles (id, user_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?3)
                ON CONFLICT (user_id) DO UPDATE SET updated_at = excluded.updated_at
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await;

            if let Err(err) = ensured {
                return match DbError::from(err) {
                    DbError::ForeignKeyViolation { .. } => {
                        Err(CoreError::not_found("User", user_id).into())
                    }
                    e => Err(e),
                };
            }

            let row = sqlx::query_as::<_, ProfileRow>(
                "SELECT username, phone, address FROM profiles WHERE user_id = ?1",
            )
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            let mut username = row.username;
            let mut phone = row.phone;
            let mut address = row.address;
            normalize(update.username).apply_to(&mut username);
            normalize(update.phone).apply_to(&mut phone);
            normalize(update.address).apply_to(&mut address);

            debug!(user_id = %user_id, username = ?username, "Writing profile row");

            let written = sqlx::query(
                r#"
                UPDATE profiles
                SET username = ?2, phone = ?3, address = ?4, updated_at = ?5
                WHERE user_id = ?1
                "#,
            )
            .bind(user_id)
            .bind(&username)
            .bind(&phone)
            .bind(&address)
            .bind(now)
            .execute(&mut *tx)
            .await;

            if let Err(err) = written {
                return match DbError::from(err) {
                    e if e.is_unique_violation_on("profiles.username") => {
                        Err(CoreError::conflict("Username already taken").into())
                    }
                    e => Err(e),
                };
            }
        }

        tx.commit().await?;

        info!(user_id = %user_id, "Profile updated");
        self.get(user_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
