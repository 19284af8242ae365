use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{
    auth,
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError},
};

/// `Authorization: Bearer <token>`; a lowercase `bearer` is accepted too.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();

    (!token.is_empty()).then_some(token)
}

/// Resolves the caller from the access token. No header means an anonymous
/// context; a bad token or a deleted user is rejected right away.
pub async fn extract_context_fn(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = match bearer_token(req.headers()).map(str::to_owned) {
        Some(token) => token,
        None => {
            req.extensions_mut().insert(RequestContext::new(None));
            return Ok(next.run(req).await);
        }
    };

    let claims = auth::process_access_token(&token, state.config().jwt().access_secret())
        .map_err(|e| WebError::auth_token_invalid(e.to_string()))?
        .claims;

    let id = claims
        .sub
        .parse::<uuid::Uuid>()
        .map_err(|e| WebError::auth_token_invalid(e.to_string()))?;

    let user = UserEntity::find_by_id(state.pool(), &AuthenticatedUser::admin(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::auth_required())?;

    req.extensions_mut()
        .insert(RequestContext::new(Some(AuthenticatedUser::from(&user))));

    Ok(next.run(req).await)
}

pub async fn require_user_fn(ctx: RequestContext, req: Request, next: Next) -> Result<Response, WebError> {
    ctx.user()?;
    Ok(next.run(req).await)
}

pub async fn require_admin_fn(
    ctx: RequestContext,
    req: Request,
    next: Next,
) -> Result<Response, WebError> {
    if !ctx.user()?.is_admin() {
        return Err(WebError::admin_required());
    }

    Ok(next.run(req).await)
}
