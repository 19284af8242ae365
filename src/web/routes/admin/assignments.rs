use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{AssignmentDetailedRow, CourseAssignment, UserEntity},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::OkResponse, error::ErrorResponse,
        routes::admin::courses::find_course,
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AssignmentCreateBody {
    pub user_id: Uuid,
    pub course_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/assignments",
            get(assignment_list_handler).post(assignment_create_handler),
        )
        .route("/assignments/{id}", delete(assignment_delete_handler))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/assignments",
    responses(
        (status = 200, description = "Every assignment with user and course details", body = Vec<AssignmentDetailedRow>),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn assignment_list_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let rows = CourseAssignment::list_detailed(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(CourseAssignment::get_resource_type(), e))?;

    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/assignments",
    request_body = AssignmentCreateBody,
    responses(
        (status = 201, description = "Course assigned", body = CourseAssignment),
        (status = 404, description = "User or course not found", body = ErrorResponse),
        (status = 409, description = "Already assigned", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn assignment_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<AssignmentCreateBody>,
) -> WebResult<impl IntoResponse> {
    let admin = ctx.user()?;

    UserEntity::find_by_id(state.pool(), admin, payload.user_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;

    find_course(&state, &ctx, payload.course_id).await?;

    let created = CourseAssignment::create(state.pool(), payload.user_id, payload.course_id)
        .await
        .map_err(|e| {
            WebError::from_write(
                CourseAssignment::get_resource_type(),
                e,
                "Course already assigned to this user",
            )
        })?;

    tracing::info!(
        "course {} assigned to {} by {}",
        payload.course_id,
        payload.user_id,
        admin.user_id()
    );
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment removed", body = OkResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn assignment_delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let found = CourseAssignment::find_by_id(state.pool(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(CourseAssignment::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(CourseAssignment::get_resource_type()))?;

    found
        .delete(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(CourseAssignment::get_resource_type(), e))?;

    Ok(Json(OkResponse::ok()))
}
