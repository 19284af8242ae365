use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lecture {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    notes_md: Option<String>,
    notes_attachment_id: Option<Uuid>,
    order_index: i32,
    video_key: String,
    storage_provider_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Lecture {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lecture
    }
}

impl Lecture {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn notes_md(&self) -> Option<&str> {
        self.notes_md.as_deref()
    }

    pub fn notes_attachment_id(&self) -> Option<Uuid> {
        self.notes_attachment_id
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    pub fn video_key(&self) -> &str {
        &self.video_key
    }

    pub fn storage_provider_id(&self) -> Option<Uuid> {
        self.storage_provider_id
    }
}

#[derive(Debug)]
pub struct LectureCreate {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub notes_md: Option<String>,
    pub order_index: i32,
    pub video_key: String,
    pub storage_provider_id: Option<Uuid>,
}

#[derive(Debug, Default)]
pub struct LectureUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes_md: Option<Option<String>>,
    pub notes_attachment_id: Option<Option<Uuid>>,
    pub order_index: Option<i32>,
    pub video_key: Option<String>,
    pub storage_provider_id: Option<Option<Uuid>>,
}

#[async_trait::async_trait]
impl CrudRepository<Lecture, LectureCreate, LectureUpdate, Uuid> for Lecture {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LectureCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO lectures (id, course_id, title, description, notes_md, order_index, video_key, storage_provider_id)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.notes_md)
        .bind(data.order_index)
        .bind(&data.video_key)
        .bind(data.storage_provider_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LectureUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            UPDATE lectures SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                notes_md = CASE WHEN $3 THEN $4 ELSE notes_md END,
                notes_attachment_id = CASE WHEN $5 THEN $6 ELSE notes_attachment_id END,
                order_index = COALESCE($7, order_index),
                video_key = COALESCE($8, video_key),
                storage_provider_id = CASE WHEN $9 THEN $10 ELSE storage_provider_id END,
                updated_at = now()
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.notes_md.is_some())
        .bind(data.notes_md.flatten())
        .bind(data.notes_attachment_id.is_some())
        .bind(data.notes_attachment_id.flatten())
        .bind(data.order_index)
        .bind(&data.video_key)
        .bind(data.storage_provider_id.is_some())
        .bind(data.storage_provider_id.flatten())
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM lectures WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM lectures WHERE id = $1")
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
            "SELECT * FROM lectures ORDER BY course_id, order_index ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lectures")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Lecture {
    pub async fn all_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM lectures WHERE course_id = $1 ORDER BY order_index ASC, created_at ASC",
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
