use axum::{extract::Request, middleware::Next, response::Response};
use chrono::{DateTime, Utc};

use crate::{
    model::entity::PlanStatus,
    web::{AuthenticatedUser, RequestContext, WebResult, error::WebError},
};

/// Admins are never blocked by plan state.
pub fn check_plan(user: &AuthenticatedUser, now: DateTime<Utc>) -> WebResult<()> {
    if user.is_admin() {
        return Ok(());
    }

    if user.plan_status() != PlanStatus::Active {
        return Err(WebError::plan_inactive());
    }

    if user.plan_active_until().is_some_and(|until| until < now) {
        return Err(WebError::plan_expired());
    }

    Ok(())
}

pub async fn require_active_plan_fn(
    ctx: RequestContext,
    req: Request,
    next: Next,
) -> Result<Response, WebError> {
    check_plan(ctx.user()?, Utc::now())?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod test {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::web::UserRole;

    fn user(role: UserRole, status: PlanStatus, until: Option<DateTime<Utc>>) -> AuthenticatedUser {
        AuthenticatedUser::new(Uuid::new_v4(), role, status, until)
    }

    #[test]
    fn plan_gate_decisions() {
        let now = Utc::now();
        let past = Some(now - Duration::hours(1));
        let future = Some(now + Duration::hours(1));

        assert!(check_plan(&user(UserRole::User, PlanStatus::Active, None), now).is_ok());
        assert!(check_plan(&user(UserRole::User, PlanStatus::Active, future), now).is_ok());

        let expired = check_plan(&user(UserRole::User, PlanStatus::Active, past), now).unwrap_err();
        assert_eq!(expired.code(), Some("PLAN_EXPIRED"));

        let inactive =
            check_plan(&user(UserRole::User, PlanStatus::Inactive, future), now).unwrap_err();
        assert_eq!(inactive.code(), Some("PLAN_INACTIVE"));

        assert!(check_plan(&user(UserRole::Admin, PlanStatus::Inactive, past), now).is_ok());
    }
}
