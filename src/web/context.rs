//! Request context, e.g. user id, its role, plan, etc.
//!

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};

use crate::{
    model::entity::{PlanStatus, UserEntity},
    web::{WebResult, error::WebError},
};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: uuid::Uuid,
    user_role: UserRole,
    plan_status: PlanStatus,
    plan_active_until: Option<DateTime<Utc>>,
}

impl AuthenticatedUser {
    pub fn new(
        user_id: uuid::Uuid,
        user_role: UserRole,
        plan_status: PlanStatus,
        plan_active_until: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id,
            user_role,
            plan_status,
            plan_active_until,
        }
    }

    /// System actor used by internal lookups (middlewares, webhooks, cli).
    pub fn admin() -> Self {
        Self {
            user_role: UserRole::Admin,
            user_id: uuid::Uuid::max(), // system admin ID
            plan_status: PlanStatus::Active,
            plan_active_until: None,
        }
    }

    pub fn user_id(&self) -> uuid::Uuid {
        self.user_id
    }

    pub fn user_role(&self) -> UserRole {
        self.user_role
    }

    pub fn is_admin(&self) -> bool {
        self.user_role == UserRole::Admin
    }

    pub fn plan_status(&self) -> PlanStatus {
        self.plan_status
    }

    pub fn plan_active_until(&self) -> Option<DateTime<Utc>> {
        self.plan_active_until
    }
}

impl From<&UserEntity> for AuthenticatedUser {
    fn from(user: &UserEntity) -> Self {
        Self::new(
            user.id(),
            user.role(),
            user.plan_status(),
            user.plan_active_until(),
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    User,
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        match value {
            "ADMIN" | "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    maybe_user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(maybe_user: Option<AuthenticatedUser>) -> Self {
        Self { maybe_user }
    }

    pub fn admin() -> Self {
        Self::new(Some(AuthenticatedUser::admin()))
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.maybe_user.as_ref()
    }

    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        self.maybe_user.as_ref().ok_or(WebError::auth_required())
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<RequestContext>();
        if let Some(ctx) = ctx {
            Ok(ctx.clone())
        } else {
            Ok(RequestContext::new(None))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_round_trips_through_db_text() {
        assert_eq!(UserRole::from("ADMIN"), UserRole::Admin);
        assert_eq!(UserRole::from("USER"), UserRole::User);
        assert_eq!(UserRole::from("anything"), UserRole::User);
        assert_eq!(UserRole::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn anonymous_context_requires_auth() {
        let ctx = RequestContext::new(None);
        assert!(ctx.user().is_err());
        assert!(RequestContext::admin().user().unwrap().is_admin());
    }
}
