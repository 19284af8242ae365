use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct VideoProgress {
    id: Uuid,
    user_id: Uuid,
    lecture_id: Uuid,
    progress_pct: f64,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for VideoProgress {
    fn get_resource_type() -> ResourceType {
        ResourceType::VideoProgress
    }
}

impl VideoProgress {
    pub fn lecture_id(&self) -> Uuid {
        self.lecture_id
    }

    pub fn progress_pct(&self) -> f64 {
        self.progress_pct
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub async fn find(
        mm: &ModelManager,
        user_id: Uuid,
        lecture_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM video_progress WHERE user_id = $1 AND lecture_id = $2",
        )
        .bind(user_id)
        .bind(lecture_id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(result)
    }

    /// One row per (user, lecture); later writes overwrite.
    pub async fn upsert(
        mm: &ModelManager,
        user_id: Uuid,
        lecture_id: Uuid,
        progress_pct: f64,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO video_progress (id, user_id, lecture_id, progress_pct)
            VALUES ($1,$2,$3,$4)
            ON CONFLICT (user_id, lecture_id)
            DO UPDATE SET progress_pct = EXCLUDED.progress_pct, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(lecture_id)
        .bind(progress_pct)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }
}
