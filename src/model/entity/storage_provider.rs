use crate::impl_paginatable_for;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// An S3-compatible bucket. The secret key is stored encrypted and never
/// leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct StorageProvider {
    id: Uuid,
    name: String,
    endpoint: Option<String>,
    region: String,
    bucket: String,
    access_key_id: String,
    #[serde(skip)]
    secret_enc: String,
    force_path_style: bool,
    active: bool,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for StorageProvider {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::StorageProvider
    }
}

impl StorageProvider {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_enc(&self) -> &str {
        &self.secret_enc
    }

    pub fn force_path_style(&self) -> bool {
        self.force_path_style
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

#[derive(Debug)]
pub struct StorageProviderCreate {
    pub name: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_enc: String,
    pub force_path_style: bool,
    pub active: bool,
    pub is_default: bool,
}

#[derive(Debug, Default)]
pub struct StorageProviderUpdate {
    pub name: Option<String>,
    pub endpoint: Option<Option<String>>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_enc: Option<String>,
    pub force_path_style: Option<bool>,
    pub active: Option<bool>,
    pub is_default: Option<bool>,
}

async fn clear_default<'e, E>(executor: E, except: Uuid) -> DatabaseResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query("UPDATE storage_providers SET is_default = FALSE WHERE is_default AND id <> $1")
        .bind(except)
        .execute(executor)
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl CrudRepository<StorageProvider, StorageProviderCreate, StorageProviderUpdate, Uuid>
    for StorageProvider
{
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: StorageProviderCreate,
    ) -> DatabaseResult<Self> {
        let id = Uuid::new_v4();
        let mut tx = mm.executor().begin().await?;

        if data.is_default {
            clear_default(&mut *tx, id).await?;
        }

        let result = sqlx::query_as(
            r#"
            INSERT INTO storage_providers
                (id, name, endpoint, region, bucket, access_key_id, secret_enc, force_path_style, active, is_default)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.endpoint)
        .bind(&data.region)
        .bind(&data.bucket)
        .bind(&data.access_key_id)
        .bind(&data.secret_enc)
        .bind(data.force_path_style)
        .bind(data.active)
        .bind(data.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: StorageProviderUpdate,
    ) -> DatabaseResult<Self> {
        let mut tx = mm.executor().begin().await?;

        if data.is_default == Some(true) {
            clear_default(&mut *tx, self.id).await?;
        }

        let result = sqlx::query_as(
            r#"
            UPDATE storage_providers SET
                name = COALESCE($1, name),
                endpoint = CASE WHEN $2 THEN $3 ELSE endpoint END,
                region = COALESCE($4, region),
                bucket = COALESCE($5, bucket),
                access_key_id = COALESCE($6, access_key_id),
                secret_enc = COALESCE($7, secret_enc),
                force_path_style = COALESCE($8, force_path_style),
                active = COALESCE($9, active),
                is_default = COALESCE($10, is_default),
                updated_at = now()
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.endpoint.is_some())
        .bind(data.endpoint.flatten())
        .bind(&data.region)
        .bind(&data.bucket)
        .bind(&data.access_key_id)
        .bind(&data.secret_enc)
        .bind(data.force_path_style)
        .bind(data.active)
        .bind(data.is_default)
        .bind(self.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM storage_providers WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM storage_providers WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM storage_providers ORDER BY is_default DESC, created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storage_providers")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(
    StorageProvider,
    StorageProviderCreate,
    StorageProviderUpdate,
    Uuid
);

impl StorageProvider {
    pub async fn find_default_active(mm: &ModelManager) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM storage_providers WHERE is_default AND active ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(mm.executor())
        .await?;

        Ok(result)
    }
}
