use crate::impl_paginatable_for;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    title: String,
    description: String,
    thumbnail_key: Option<String>,
    price_inr_paise: i64,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn thumbnail_key(&self) -> Option<&str> {
        self.thumbnail_key.as_deref()
    }

    pub fn price_inr_paise(&self) -> i64 {
        self.price_inr_paise
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug)]
pub struct CourseCreate {
    pub title: String,
    pub description: String,
    pub thumbnail_key: Option<String>,
    pub price_inr_paise: i64,
}

#[derive(Debug, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_key: Option<Option<String>>,
    pub price_inr_paise: Option<i64>,
}

#[async_trait::async_trait]
impl CrudRepository<Course, CourseCreate, CourseUpdate, Uuid> for Course {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO courses (id, title, description, thumbnail_key, price_inr_paise) VALUES ($1,$2,$3,$4,$5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.thumbnail_key)
        .bind(data.price_inr_paise)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            UPDATE courses SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                thumbnail_key = CASE WHEN $3 THEN $4 ELSE thumbnail_key END,
                price_inr_paise = COALESCE($5, price_inr_paise),
                updated_at = now()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.thumbnail_key.is_some())
        .bind(data.thumbnail_key.flatten())
        .bind(data.price_inr_paise)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM courses ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(Course, CourseCreate, CourseUpdate, Uuid);

// Utils

/// Catalog row as seen by one user.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseWithAssignmentRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_key: Option<String>,
    pub price_inr_paise: i64,
    pub created_at: DateTime<Utc>,
    pub assigned: bool,
}

impl CourseWithAssignmentRow {
    pub async fn list_for_user(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                c.id,
                c.title,
                c.description,
                c.thumbnail_key,
                c.price_inr_paise,
                c.created_at,
                (ca.id IS NOT NULL) AS assigned
            FROM courses c
            LEFT JOIN course_assignments ca
                ON ca.course_id = c.id AND ca.user_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
