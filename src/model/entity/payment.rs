use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{
        DatabaseResult, HasOwner, ModelManager, ResourceType, ResourceTyped,
        entity::{CourseAssignment, Coupon},
    },
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Created,
    Paid,
    Failed,
}

impl From<&str> for PaymentStatus {
    fn from(value: &str) -> Self {
        match value {
            "PAID" => Self::Paid,
            "FAILED" => Self::Failed,
            _ => Self::Created,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Paid => write!(f, "PAID"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    id: Uuid,
    provider: String,
    provider_order_id: String,
    provider_payment_id: Option<String>,
    user_id: Uuid,
    course_id: Uuid,
    coupon_id: Option<Uuid>,
    amount_paise: i64,
    currency: String,
    status: String,
    #[serde(skip)]
    raw_payload: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct PaymentCreate {
    pub provider_order_id: String,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub coupon_id: Option<Uuid>,
    pub amount_paise: i64,
    pub raw_payload: Option<serde_json::Value>,
}

impl ResourceTyped for Payment {
    fn get_resource_type() -> ResourceType {
        ResourceType::Payment
    }
}

#[async_trait::async_trait]
impl HasOwner for Payment {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

impl Payment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn provider_order_id(&self) -> &str {
        &self.provider_order_id
    }

    pub fn provider_payment_id(&self) -> Option<&str> {
        self.provider_payment_id.as_deref()
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn coupon_id(&self) -> Option<Uuid> {
        self.coupon_id
    }

    pub fn amount_paise(&self) -> i64 {
        self.amount_paise
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::from(self.status.as_str())
    }

    pub fn raw_payload(&self) -> Option<&serde_json::Value> {
        self.raw_payload.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn create(mm: &ModelManager, data: PaymentCreate) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO payments (id, provider_order_id, user_id, course_id, coupon_id, amount_paise, raw_payload)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.provider_order_id)
        .bind(data.user_id)
        .bind(data.course_id)
        .bind(data.coupon_id)
        .bind(data.amount_paise)
        .bind(data.raw_payload)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn find_by_provider_order_id(
        mm: &ModelManager,
        order_id: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM payments WHERE provider_order_id = $1")
            .bind(order_id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    /// Flips the payment to PAID, bumps the coupon counter and grants the
    /// course in one transaction. Returns `false` if another delivery got
    /// there first; nothing is changed in that case.
    pub async fn mark_paid(
        &self,
        mm: &ModelManager,
        provider_payment_id: Option<&str>,
        payload: &serde_json::Value,
    ) -> DatabaseResult<bool> {
        let mut tx = mm.executor().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE payments SET
                status = 'PAID',
                provider_payment_id = COALESCE($2, provider_payment_id),
                raw_payload = $3,
                updated_at = now()
            WHERE id = $1 AND status <> 'PAID'
            "#,
        )
        .bind(self.id)
        .bind(provider_payment_id)
        .bind(payload)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(coupon_id) = self.coupon_id {
            Coupon::increment_redeemed(&mut *tx, coupon_id).await?;
        }
        CourseAssignment::ensure(&mut *tx, self.user_id, self.course_id).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// A PAID payment is never downgraded.
    pub async fn mark_failed(
        &self,
        mm: &ModelManager,
        provider_payment_id: Option<&str>,
        payload: &serde_json::Value,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE payments SET
                status = 'FAILED',
                provider_payment_id = COALESCE($2, provider_payment_id),
                raw_payload = $3,
                updated_at = now()
            WHERE id = $1 AND status <> 'PAID'
            "#,
        )
        .bind(self.id)
        .bind(provider_payment_id)
        .bind(payload)
        .execute(mm.executor())
        .await?;

        Ok(())
    }

    pub async fn store_payload(
        &self,
        mm: &ModelManager,
        payload: &serde_json::Value,
    ) -> DatabaseResult<()> {
        sqlx::query("UPDATE payments SET raw_payload = $2, updated_at = now() WHERE id = $1")
            .bind(self.id)
            .bind(payload)
            .execute(mm.executor())
            .await?;

        Ok(())
    }
}
