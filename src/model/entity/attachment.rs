use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped};

/// A downloadable file. `lecture_id = None` means a course-level attachment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Attachment {
    id: Uuid,
    course_id: Uuid,
    lecture_id: Option<Uuid>,
    title: String,
    file_key: String,
    mime_type: String,
    size_bytes: Option<i64>,
    storage_provider_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AttachmentCreate {
    pub course_id: Uuid,
    pub lecture_id: Option<Uuid>,
    pub title: String,
    pub file_key: String,
    pub mime_type: String,
    pub size_bytes: Option<i64>,
    pub storage_provider_id: Option<Uuid>,
}

impl ResourceTyped for Attachment {
    fn get_resource_type() -> ResourceType {
        ResourceType::Attachment
    }
}

impl Attachment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn lecture_id(&self) -> Option<Uuid> {
        self.lecture_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn file_key(&self) -> &str {
        &self.file_key
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> Option<i64> {
        self.size_bytes
    }

    pub fn storage_provider_id(&self) -> Option<Uuid> {
        self.storage_provider_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn create(mm: &ModelManager, data: AttachmentCreate) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO attachments (id, course_id, lecture_id, title, file_key, mime_type, size_bytes, storage_provider_id)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(data.lecture_id)
        .bind(&data.title)
        .bind(&data.file_key)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(data.storage_provider_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM attachments WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    pub async fn list_for_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM attachments WHERE course_id = $1 AND lecture_id IS NULL ORDER BY created_at DESC",
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn list_for_lecture(
        mm: &ModelManager,
        lecture_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM attachments WHERE lecture_id = $1 ORDER BY created_at DESC",
        )
        .bind(lecture_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }
}
