//! PostgreSQL Repository Implementations

use std::time::Duration;

use chrono::{DateTime, Utc};
use platform::rate_limit::{RateLimitError, RateLimiter};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{personal_access_token::PersonalAccessToken, user::User};
use crate::domain::repository::{PersonalAccessTokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, token_id::TokenId, user_id::UserId, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired access tokens
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = self.delete_expired_tokens(Utc::now()).await?;

        tracing::info!(tokens_deleted = deleted, "Cleaned up expired access tokens");

        Ok(deleted)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                name,
                email,
                password_hash,
                email_verified_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.email_verified_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::EmailTaken
            } else {
                AuthError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                name,
                email,
                password_hash,
                email_verified_at,
                created_at,
                updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                name,
                email,
                password_hash,
                email_verified_at,
                created_at,
                updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}

// ============================================================================
// Personal Access Token Repository Implementation
// ============================================================================

impl PersonalAccessTokenRepository for PgAuthRepository {
    async fn store_token(&self, token: &PersonalAccessToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO personal_access_tokens (
                token_id,
                user_id,
                name,
                token_hash,
                abilities,
                last_used_at,
                expires_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(token.token_id.as_uuid())
        .bind(token.user_id.as_uuid())
        .bind(&token.name)
        .bind(&token.token_hash)
        .bind(&token.abilities)
        .bind(token.last_used_at)
        .bind(token.expires_at)
        .bind(token.created_at)
        .bind(token.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_token_by_id(
        &self,
        token_id: &TokenId,
    ) -> AuthResult<Option<PersonalAccessToken>> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT
                token_id,
                user_id,
                name,
                token_hash,
                abilities,
                last_used_at,
                expires_at,
                created_at,
                updated_at
            FROM personal_access_tokens
            WHERE token_id = $1
            "#,
        )
        .bind(token_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_token()))
    }

    async fn find_token_by_hash(
        &self,
        token_hash: &str,
    ) -> AuthResult<Option<PersonalAccessToken>> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT
                token_id,
                user_id,
                name,
                token_hash,
                abilities,
                last_used_at,
                expires_at,
                created_at,
                updated_at
            FROM personal_access_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_token()))
    }

    async fn touch_token(&self, token_id: &TokenId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE personal_access_tokens SET
                last_used_at = $2,
                updated_at = $2
            WHERE token_id = $1
            "#,
        )
        .bind(token_id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM personal_access_tokens WHERE expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Rate Limiter
// ============================================================================

/// Rate limiter over the `rate_limits` table, shared by every instance
/// pointed at the same database.
///
/// Each hit is a single upsert, so concurrent hits on one key serialize
/// on the row lock.
#[derive(Clone)]
pub struct PgRateLimiter {
    pool: PgPool,
}

impl PgRateLimiter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete counters whose window has elapsed
    pub async fn cleanup_expired(&self) -> Result<u64, RateLimitError> {
        let deleted = sqlx::query("DELETE FROM rate_limits WHERE expires_at_ms <= $1")
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(RateLimitError::unavailable)?
            .rows_affected();

        tracing::info!(rate_limits_deleted = deleted, "Cleaned up expired rate limits");

        Ok(deleted)
    }

    async fn live_counter(&self, key: &str) -> Result<Option<(i32, i64)>, RateLimitError> {
        sqlx::query_as::<_, (i32, i64)>(
            r#"
            SELECT attempts, expires_at_ms
            FROM rate_limits
            WHERE rate_limit_key = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(key)
        .bind(Utc::now().timestamp_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(RateLimitError::unavailable)
    }
}

impl RateLimiter for PgRateLimiter {
    async fn too_many_attempts(
        &self,
        key: &str,
        max_attempts: u32,
    ) -> Result<bool, RateLimitError> {
        Ok(self.attempts(key).await? >= max_attempts)
    }

    async fn hit(&self, key: &str, decay: Duration) -> Result<u32, RateLimitError> {
        let now_ms = Utc::now().timestamp_millis();
        let decay_ms = decay.as_millis() as i64;

        let attempts = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO rate_limits (rate_limit_key, attempts, expires_at_ms)
            VALUES ($1, 1, $2 + $3)
            ON CONFLICT (rate_limit_key) DO UPDATE SET
                attempts = CASE
                    WHEN rate_limits.expires_at_ms <= $2 THEN 1
                    ELSE rate_limits.attempts + 1
                END,
                expires_at_ms = CASE
                    WHEN rate_limits.expires_at_ms <= $2 THEN $2 + $3
                    ELSE rate_limits.expires_at_ms
                END
            RETURNING attempts
            "#,
        )
        .bind(key)
        .bind(now_ms)
        .bind(decay_ms)
        .fetch_one(&self.pool)
        .await
        .map_err(RateLimitError::unavailable)?;

        Ok(attempts.max(0) as u32)
    }

    async fn attempts(&self, key: &str) -> Result<u32, RateLimitError> {
        let counter = self.live_counter(key).await?;
        Ok(counter.map_or(0, |(attempts, _)| attempts.max(0) as u32))
    }

    async fn clear(&self, key: &str) -> Result<(), RateLimitError> {
        sqlx::query("DELETE FROM rate_limits WHERE rate_limit_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(RateLimitError::unavailable)?;

        Ok(())
    }

    async fn available_in(&self, key: &str) -> Result<Duration, RateLimitError> {
        let now_ms = Utc::now().timestamp_millis();
        let remaining_ms = self
            .live_counter(key)
            .await?
            .map_or(0, |(_, expires_at_ms)| (expires_at_ms - now_ms).max(0));

        Ok(Duration::from_millis(remaining_ms as u64))
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    email_verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password = UserPassword::from_phc_string(self.password_hash)?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            name: self.name,
            email: Email::from_db(self.email),
            password,
            email_verified_at: self.email_verified_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    token_id: Uuid,
    user_id: Uuid,
    name: String,
    token_hash: String,
    abilities: Vec<String>,
    last_used_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TokenRow {
    fn into_token(self) -> PersonalAccessToken {
        PersonalAccessToken {
            token_id: TokenId::from_uuid(self.token_id),
            user_id: UserId::from_uuid(self.user_id),
            name: self.name,
            token_hash: self.token_hash,
            abilities: self.abilities,
            last_used_at: self.last_used_at,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
