use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::hash_password,
    model::{
        CrudRepository, Page, PaginatableRepository, ResourceTyped,
        entity::{PlanStatus, RefreshToken, UserEntity, UserEntityCreate, UserEntityUpdate},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::{OkResponse, double_option, users::UserResponse},
        error::ErrorResponse,
        routes::PaginationQuery,
    },
};

const EMAIL_EXISTS: &str = "Email already exists";

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UserCreateBody {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Option<UserRole>,
    pub plan_status: Option<PlanStatus>,
    pub plan_active_until: Option<DateTime<Utc>>,
}

/// Absent fields are kept; `plan_active_until: null` clears the expiry.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UserUpdateBody {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub role: Option<UserRole>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub plan_status: Option<PlanStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub plan_active_until: Option<Option<DateTime<Utc>>>,
}

impl UserUpdateBody {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.password.is_none()
            && self.plan_status.is_none()
            && self.plan_active_until.is_none()
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(user_list_handler).post(user_create_handler))
        .route(
            "/users/{id}",
            get(user_get_handler)
                .patch(user_update_handler)
                .delete(user_delete_handler),
        )
}

async fn find_user(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<UserEntity> {
    UserEntity::find_by_id(state.pool(), ctx.user()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page", body = Page<UserResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn user_list_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let users = UserEntity::page(state.pool(), user, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok(Json(users.map(UserResponse::from)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    request_body = UserCreateBody,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn user_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<UserCreateBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let user = ctx.user()?;
    let email = payload.email.trim().to_lowercase();

    let existing = UserEntity::find_by_email(state.pool(), user, &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if existing.is_some() {
        return Err(WebError::resource_conflict(UserEntity::get_resource_type(), EMAIL_EXISTS));
    }

    let password_hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;

    let created = UserEntity::create(
        state.pool(),
        user,
        UserEntityCreate {
            email,
            name: payload.name,
            password_hash,
            role: payload.role.unwrap_or(UserRole::User),
            plan_status: payload.plan_status.unwrap_or(PlanStatus::Active),
            plan_active_until: payload.plan_active_until,
        },
    )
    .await
    .map_err(|e| WebError::from_write(UserEntity::get_resource_type(), e, EMAIL_EXISTS))?;

    tracing::info!("admin {} created user {}", user.user_id(), created.id());
    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn user_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let found = find_user(&state, &ctx, id).await?;
    Ok(Json(UserResponse::from(found)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserUpdateBody,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error or empty body", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn user_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdateBody>,
) -> WebResult<impl IntoResponse> {
    if payload.is_empty() {
        return Err(WebError::no_fields_to_update());
    }
    payload.validate()?;

    let user = ctx.user()?;
    let found = find_user(&state, &ctx, id).await?;

    let password_hash = payload
        .password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(WebError::server_crypt_error)?;
    let password_changed = password_hash.is_some();

    let updated = found
        .update(
            state.pool(),
            user,
            UserEntityUpdate {
                name: payload.name,
                role: payload.role,
                password_hash,
                plan_status: payload.plan_status,
                plan_active_until: payload.plan_active_until,
            },
        )
        .await
        .map_err(|e| WebError::from_db(UserEntity::get_resource_type(), e))?;

    if password_changed {
        let revoked = RefreshToken::revoke_all_for_user(state.pool().executor(), updated.id())
            .await
            .map_err(|e| WebError::from_db(UserEntity::get_resource_type(), e))?;
        tracing::info!("password reset for {}, {} session(s) revoked", updated.id(), revoked);
    }

    Ok(Json(UserResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = OkResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn user_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = find_user(&state, &ctx, id).await?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::from_db(UserEntity::get_resource_type(), e))?;

    tracing::info!("admin {} deleted user {}", user.user_id(), id);
    Ok(Json(OkResponse::ok()))
}
