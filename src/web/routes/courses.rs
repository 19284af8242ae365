use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Course, CourseAssignment, CourseWithAssignmentRow, Lecture},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::courses::{CourseDetailResponse, CourseListResponse, CourseWithLectures},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(course_list_handler))
        .route("/{id}", get(course_detail_handler))
        .route_layer(middleware::from_fn(middlewares::require_user_fn))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    description = "Lists every course with an `assigned` flag for the caller",
    responses(
        (status = 200, description = "Course catalogue", body = CourseListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []))
)]
async fn course_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let courses = CourseWithAssignmentRow::list_for_user(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok(Json(CourseListResponse { courses }))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    description = "Course details; lectures are only listed once the course is assigned",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course", body = CourseDetailResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("bearer" = []))
)]
async fn course_detail_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let course = Course::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    let assigned = CourseAssignment::find_by_user_course(state.pool(), user.user_id(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(CourseAssignment::get_resource_type(), e))?
        .is_some();

    if !assigned {
        return Ok(Json(CourseDetailResponse {
            course: CourseWithLectures::new(&course, &[]),
            assigned: false,
        }));
    }

    let lectures = Lecture::all_by_course(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lecture::get_resource_type(), e))?;

    Ok(Json(CourseDetailResponse {
        course: CourseWithLectures::new(&course, &lectures),
        assigned: true,
    }))
}
