/// Bearer token storage
///
/// Each user holds at most one live token. Registration and login both go
/// through [`AuthToken::get_or_create`], so repeated logins hand back the same
/// key instead of minting a new one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auth_tokens (
///     key VARCHAR(64) PRIMARY KEY,
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::token::generate_token;

/// Opaque bearer credential bound to one user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthToken {
    /// Token key presented in the Authorization header
    pub key: String,

    /// Owning user
    pub user_id: Uuid,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// Returns the user's token, issuing one if none exists.
    ///
    /// Runs as a single upsert so concurrent logins converge on one row. The
    /// boolean is true when a new token was inserted.
    pub async fn get_or_create(pool: &PgPool, user_id: Uuid) -> Result<(Self, bool), sqlx::Error> {
        let (key, user_id, created_at, created): (String, Uuid, DateTime<Utc>, bool) =
            sqlx::query_as(
                r#"
                INSERT INTO auth_tokens (key, user_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
                RETURNING key, user_id, created_at, (xmax = 0) AS created
                "#,
            )
            .bind(generate_token())
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok((
            Self {
                key,
                user_id,
                created_at,
            },
            created,
        ))
    }

    /// Looks up a token by its key
    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, AuthToken>(
            "SELECT key, user_id, created_at FROM auth_tokens WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }
}
