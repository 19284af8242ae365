use crate::impl_paginatable_for;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Exactly one of `percent_off` / `amount_off_paise` is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Coupon {
    id: Uuid,
    code: String,
    course_id: Option<Uuid>,
    #[sqlx(default)]
    course_title: Option<String>,
    percent_off: Option<i32>,
    amount_off_paise: Option<i64>,
    active: bool,
    expires_at: Option<DateTime<Utc>>,
    max_redemptions: Option<i32>,
    redeemed_count: i32,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Coupon {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Coupon
    }
}

impl Coupon {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn course_id(&self) -> Option<Uuid> {
        self.course_id
    }

    pub fn percent_off(&self) -> Option<i32> {
        self.percent_off
    }

    pub fn amount_off_paise(&self) -> Option<i64> {
        self.amount_off_paise
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn max_redemptions(&self) -> Option<i32> {
        self.max_redemptions
    }

    pub fn redeemed_count(&self) -> i32 {
        self.redeemed_count
    }
}

#[derive(Debug)]
pub struct CouponCreate {
    pub code: String,
    pub course_id: Option<Uuid>,
    pub percent_off: Option<i32>,
    pub amount_off_paise: Option<i64>,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_redemptions: Option<i32>,
}

#[derive(Debug, Default)]
pub struct CouponUpdate {
    pub active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub max_redemptions: Option<Option<i32>>,
}

#[async_trait::async_trait]
impl CrudRepository<Coupon, CouponCreate, CouponUpdate, Uuid> for Coupon {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CouponCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO coupons (id, code, course_id, percent_off, amount_off_paise, active, expires_at, max_redemptions)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.code.to_uppercase())
        .bind(data.course_id)
        .bind(data.percent_off)
        .bind(data.amount_off_paise)
        .bind(data.active)
        .bind(data.expires_at)
        .bind(data.max_redemptions)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CouponUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            UPDATE coupons SET
                active = COALESCE($1, active),
                expires_at = CASE WHEN $2 THEN $3 ELSE expires_at END,
                max_redemptions = CASE WHEN $4 THEN $5 ELSE max_redemptions END
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(data.active)
        .bind(data.expires_at.is_some())
        .bind(data.expires_at.flatten())
        .bind(data.max_redemptions.is_some())
        .bind(data.max_redemptions.flatten())
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM coupons WHERE id = $1")
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
        let result = sqlx::query_as(
            r#"
            SELECT cp.*, c.title AS course_title
            FROM coupons cp
            LEFT JOIN courses c ON c.id = cp.course_id
            WHERE cp.id = $1
            "#,
        )
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
            r#"
            SELECT cp.*, c.title AS course_title
            FROM coupons cp
            LEFT JOIN courses c ON c.id = cp.course_id
            ORDER BY cp.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(Coupon, CouponCreate, CouponUpdate, Uuid);

impl Coupon {
    /// Codes are stored uppercase.
    pub async fn find_by_code(mm: &ModelManager, code: &str) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM coupons WHERE code = $1")
            .bind(code.trim().to_uppercase())
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    pub async fn increment_redeemed<'e, E>(executor: E, id: Uuid) -> DatabaseResult<()>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query("UPDATE coupons SET redeemed_count = redeemed_count + 1 WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
impl Coupon {
    /// Detached coupon for pricing tests.
    pub fn fixture(
        course_id: Option<Uuid>,
        percent_off: Option<i32>,
        amount_off_paise: Option<i64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: "TEST10".to_string(),
            course_id,
            course_title: None,
            percent_off,
            amount_off_paise,
            active: true,
            expires_at: None,
            max_redemptions: None,
            redeemed_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn with_redemptions(mut self, max: Option<i32>, redeemed: i32) -> Self {
        self.max_redemptions = max;
        self.redeemed_count = redeemed;
        self
    }
}
