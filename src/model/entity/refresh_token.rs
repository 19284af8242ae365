use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{DatabaseResult, ResourceType, ResourceTyped};

/// Server-side record of an issued refresh token. Only the SHA-256 of the
/// token is stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for RefreshToken {
    fn get_resource_type() -> ResourceType {
        ResourceType::RefreshToken
    }
}

impl RefreshToken {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }

    pub async fn create<'e, E>(
        executor: E,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DatabaseResult<Self>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query_as(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at) VALUES ($1,$2,$3,$4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(executor)
        .await?;

        Ok(result)
    }

    /// Not revoked and not expired.
    pub async fn find_active<'e, E>(
        executor: E,
        user_id: Uuid,
        token_hash: &str,
    ) -> DatabaseResult<Option<Self>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM refresh_tokens
            WHERE user_id = $1
              AND token_hash = $2
              AND revoked_at IS NULL
              AND expires_at > now()
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(executor)
        .await?;

        Ok(result)
    }

    /// Returns `false` when the record was already revoked, so a token
    /// cannot be rotated twice.
    pub async fn revoke<'e, E>(executor: E, id: Uuid) -> DatabaseResult<bool>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = now() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn revoke_by_hash<'e, E>(executor: E, token_hash: &str) -> DatabaseResult<u64>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = now() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn revoke_all_for_user<'e, E>(executor: E, user_id: Uuid) -> DatabaseResult<u64>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = now() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Drops rows that can never be used again.
    pub async fn cleanup_expired<'e, E>(executor: E) -> DatabaseResult<u64>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE expires_at < now() OR revoked_at < now() - interval '1 day'",
        )
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
