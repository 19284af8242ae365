use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::web::AuthenticatedUser;
use crate::web::UserRole;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanStatus {
    Active,
    Inactive,
}

impl From<&str> for PlanStatus {
    fn from(value: &str) -> Self {
        match value {
            "ACTIVE" => Self::Active,
            _ => Self::Inactive,
        }
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserEntity {
    id: Uuid,
    email: String,
    name: Option<String>,
    #[serde(skip)]
    password_hash: String,
    role: String,
    plan_status: String,
    plan_active_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct UserEntityCreate {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    pub plan_status: PlanStatus,
    pub plan_active_until: Option<DateTime<Utc>>,
}

impl UserEntityCreate {
    /// Self-registered account: plain user with an active plan.
    pub fn signup(email: String, name: Option<String>, password_hash: String) -> Self {
        Self {
            email,
            name,
            password_hash,
            role: UserRole::User,
            plan_status: PlanStatus::Active,
            plan_active_until: None,
        }
    }
}

/// `None` keeps the column; `plan_active_until: Some(None)` clears it.
#[derive(Debug, Default)]
pub struct UserEntityUpdate {
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub password_hash: Option<String>,
    pub plan_status: Option<PlanStatus>,
    pub plan_active_until: Option<Option<DateTime<Utc>>>,
}

impl ResourceTyped for UserEntity {
    fn get_resource_type() -> crate::model::repo::ResourceType {
        crate::model::repo::ResourceType::User
    }
}

impl UserEntity {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> UserRole {
        UserRole::from(self.role.as_str())
    }

    pub fn plan_status(&self) -> PlanStatus {
        PlanStatus::from(self.plan_status.as_str())
    }

    pub fn plan_active_until(&self) -> Option<DateTime<Utc>> {
        self.plan_active_until
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[async_trait::async_trait]
impl CrudRepository<UserEntity, UserEntityCreate, UserEntityUpdate, Uuid> for UserEntity {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, plan_status, plan_active_until)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.email.to_lowercase())
        .bind(&data.name)
        .bind(&data.password_hash)
        .bind(data.role.to_string())
        .bind(data.plan_status.to_string())
        .bind(data.plan_active_until)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            UPDATE users SET
                name = COALESCE($1, name),
                role = COALESCE($2, role),
                password_hash = COALESCE($3, password_hash),
                plan_status = COALESCE($4, plan_status),
                plan_active_until = CASE WHEN $5 THEN $6 ELSE plan_active_until END,
                updated_at = now()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.role.map(|r| r.to_string()))
        .bind(&data.password_hash)
        .bind(data.plan_status.map(|p| p.to_string()))
        .bind(data.plan_active_until.is_some())
        .bind(data.plan_active_until.flatten())
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM users WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(UserEntity, UserEntityCreate, UserEntityUpdate, Uuid);

#[async_trait]
impl HasOwner for UserEntity {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.id) // owners of users are themselves
    }
}

impl UserEntity {
    /// Emails are stored lowercase, lookups normalize the same way.
    pub async fn find_by_email(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        email: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}
