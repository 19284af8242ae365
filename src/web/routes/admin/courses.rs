use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::{
        CrudRepository, Page, PaginatableRepository, ResourceTyped,
        entity::{Course, CourseCreate, CourseUpdate, Lecture},
    },
    payments::MAX_PRICE_PAISE,
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{OkResponse, courses::CourseWithLectures, double_option},
        error::ErrorResponse,
        routes::PaginationQuery,
    },
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CourseCreateBody {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub thumbnail_key: Option<String>,
    #[validate(range(min = 0, max = MAX_PRICE_PAISE))]
    pub price_inr_paise: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CourseUpdateBody {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub thumbnail_key: Option<Option<String>>,
    #[validate(range(min = 0, max = MAX_PRICE_PAISE))]
    pub price_inr_paise: Option<i64>,
}

impl CourseUpdateBody {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.thumbnail_key.is_none()
            && self.price_inr_paise.is_none()
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(admin_course_list_handler).post(course_create_handler))
        .route(
            "/courses/{id}",
            get(course_get_handler)
                .patch(course_update_handler)
                .delete(course_delete_handler),
        )
}

pub(crate) async fn find_course(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
) -> WebResult<Course> {
    Course::find_by_id(state.pool(), ctx.user()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/courses",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page", body = Page<Course>),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn admin_course_list_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let courses = Course::page(state.pool(), ctx.user()?, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok(Json(courses))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/courses",
    request_body = CourseCreateBody,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Validation error", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn course_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreateBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let created = Course::create(
        state.pool(),
        ctx.user()?,
        CourseCreate {
            title: payload.title,
            description: payload.description,
            thumbnail_key: payload.thumbnail_key,
            price_inr_paise: payload.price_inr_paise.unwrap_or(0),
        },
    )
    .await
    .map_err(|e| WebError::from_db(Course::get_resource_type(), e))?;

    tracing::info!("course {} created", created.id());
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with its lectures", body = CourseWithLectures),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn course_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;

    let lectures = Lecture::all_by_course(state.pool(), ctx.user()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lecture::get_resource_type(), e))?;

    Ok(Json(CourseWithLectures::new(&course, &lectures)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = CourseUpdateBody,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Validation error or empty body", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn course_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseUpdateBody>,
) -> WebResult<impl IntoResponse> {
    if payload.is_empty() {
        return Err(WebError::no_fields_to_update());
    }
    payload.validate()?;

    let found = find_course(&state, &ctx, id).await?;
    let updated = found
        .update(
            state.pool(),
            ctx.user()?,
            CourseUpdate {
                title: payload.title,
                description: payload.description,
                thumbnail_key: payload.thumbnail_key,
                price_inr_paise: payload.price_inr_paise,
            },
        )
        .await
        .map_err(|e| WebError::from_db(Course::get_resource_type(), e))?;

    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted with its lectures and attachments", body = OkResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn course_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let found = find_course(&state, &ctx, id).await?;

    found
        .delete(state.pool(), ctx.user()?)
        .await
        .map_err(|e| WebError::from_db(Course::get_resource_type(), e))?;

    tracing::info!("course {} deleted", id);
    Ok(Json(OkResponse::ok()))
}
