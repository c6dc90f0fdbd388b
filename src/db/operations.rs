use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::User;
use crate::error::AppError;
use crate::Result;

/// The narrow store interface the auth flows run against. Production uses
/// [`PgUserStore`]; tests substitute an in-memory fake.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>>;

    /// Lookup by reset token, filtered to non-expired rows at query time.
    /// Expired tokens are indistinguishable from absent ones.
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>>;

    async fn create(&self, user: &User) -> Result<User>;

    /// Overwrite (or clear, with `None`) the single stored refresh token.
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<()>;

    /// Conditional rotation: the stored token is replaced only if it still
    /// equals `current`. Returns false when the row was not updated, i.e. the
    /// presented token has been superseded or cleared. Two racing refreshes
    /// for the same user resolve at the database row: at most one wins.
    async fn rotate_refresh_token(&self, id: Uuid, current: &str, next: &str) -> Result<bool>;

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<()>;

    /// Store a new password hash, clearing the reset token, its expiry, and
    /// the stored refresh token in the same write.
    async fn reset_password(&self, id: Uuid, password_hash: &str) -> Result<()>;

    /// Attach a Google identity to an existing account. The password hash is
    /// left untouched; the avatar is only overwritten when one is supplied.
    async fn link_google_account(
        &self,
        id: Uuid,
        google_id: &str,
        avatar: Option<&str>,
    ) -> Result<User>;
}

const USER_COLUMNS: &str = "id, email, name, password_hash, organization, role, google_id, \
     avatar, refresh_token, reset_token, reset_token_expiry, created_at, updated_at";

pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_id = $1"
        ))
        .bind(google_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE reset_token = $1 AND reset_token_expiry > NOW()"
        ))
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn create(&self, user: &User) -> Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.organization)
        .bind(&user.role)
        .bind(&user.google_id)
        .bind(&user.avatar)
        .bind(&user.refresh_token)
        .bind(&user.reset_token)
        .bind(user.reset_token_expiry)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|err| {
            // A concurrent signup can slip past the pre-check; surface the
            // unique-email violation as the same conflict.
            if let sqlx::Error::Database(db) = &err {
                if db.is_unique_violation() {
                    return AppError::EmailConflict;
                }
            }
            AppError::Database(err)
        })?;

        Ok(created)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<()> {
        sqlx::query(
            "UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn rotate_refresh_token(&self, id: Uuid, current: &str, next: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $3, updated_at = NOW() \
             WHERE id = $1 AND refresh_token = $2",
        )
        .bind(id)
        .bind(current)
        .bind(next)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET reset_token = $2, reset_token_expiry = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(expiry)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn reset_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET password_hash = $2, reset_token = NULL, \
             reset_token_expiry = NULL, refresh_token = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn link_google_account(
        &self,
        id: Uuid,
        google_id: &str,
        avatar: Option<&str>,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET google_id = $2, avatar = COALESCE($3, avatar), \
             updated_at = NOW() WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(google_id)
        .bind(avatar)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(user)
    }
}
