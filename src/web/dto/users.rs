use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    model::entity::{PlanStatus, UserEntity},
    web::UserRole,
};

/// Public view of a user.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    id: Uuid,
    email: String,
    name: Option<String>,
    role: UserRole,
    plan_status: PlanStatus,
    plan_active_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<UserEntity> for UserResponse {
    fn from(user: UserEntity) -> Self {
        Self::from(&user)
    }
}

impl From<&UserEntity> for UserResponse {
    fn from(user: &UserEntity) -> Self {
        Self {
            id: user.id(),
            email: user.email().to_string(),
            name: user.name().map(str::to_string),
            role: user.role(),
            plan_status: user.plan_status(),
            plan_active_until: user.plan_active_until(),
            created_at: user.created_at(),
        }
    }
}
