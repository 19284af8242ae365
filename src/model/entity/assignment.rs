use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, HasOwner, ModelManager, ResourceType, ResourceTyped},
    web::AuthenticatedUser,
};

/// Grants one user access to one course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseAssignment {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for CourseAssignment {
    fn get_resource_type() -> ResourceType {
        ResourceType::Assignment
    }
}

#[async_trait::async_trait]
impl HasOwner for CourseAssignment {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

/// Admin listing row.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct AssignmentDetailedRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: Option<String>,
    pub user_role: String,
    pub course_id: Uuid,
    pub course_title: String,
    pub created_at: DateTime<Utc>,
}

impl CourseAssignment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    /// Fails with a unique violation when the pair already exists.
    pub async fn create(
        mm: &ModelManager,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO course_assignments (id, user_id, course_id) VALUES ($1,$2,$3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    /// Idempotent grant.
    pub async fn ensure<'e, E>(executor: E, user_id: Uuid, course_id: Uuid) -> DatabaseResult<()>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO course_assignments (id, user_id, course_id)
            VALUES ($1,$2,$3)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM course_assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    pub async fn find_by_user_course(
        mm: &ModelManager,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM course_assignments WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn list_detailed(mm: &ModelManager) -> DatabaseResult<Vec<AssignmentDetailedRow>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                ca.id,
                ca.user_id,
                u.email AS user_email,
                u.name AS user_name,
                u.role AS user_role,
                ca.course_id,
                c.title AS course_title,
                ca.created_at
            FROM course_assignments ca
            JOIN users u ON u.id = ca.user_id
            JOIN courses c ON c.id = ca.course_id
            ORDER BY ca.created_at DESC
            "#,
        )
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    pub async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM course_assignments WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }
}
