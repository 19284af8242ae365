use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Attachment, Lecture, LectureCreate, LectureUpdate},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{OkResponse, double_option},
        error::ErrorResponse,
        routes::admin::courses::find_course,
    },
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LectureCreateBody {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub notes_md: Option<String>,
    #[validate(range(min = 0))]
    pub order_index: i32,
    #[validate(length(min = 1))]
    pub video_key: String,
    pub storage_provider_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LectureUpdateBody {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes_md: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub notes_attachment_id: Option<Option<Uuid>>,
    #[validate(range(min = 0))]
    pub order_index: Option<i32>,
    #[validate(length(min = 1))]
    pub video_key: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub storage_provider_id: Option<Option<Uuid>>,
}

impl LectureUpdateBody {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.notes_md.is_none()
            && self.notes_attachment_id.is_none()
            && self.order_index.is_none()
            && self.video_key.is_none()
            && self.storage_provider_id.is_none()
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses/{id}/lectures", post(lecture_create_handler))
        .route(
            "/lectures/{id}",
            patch(lecture_update_handler).delete(lecture_delete_handler),
        )
}

pub(crate) async fn find_lecture(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
) -> WebResult<Lecture> {
    Lecture::find_by_id(state.pool(), ctx.user()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lecture::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lecture::get_resource_type()))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/courses/{id}/lectures",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = LectureCreateBody,
    responses(
        (status = 201, description = "Lecture created", body = Lecture),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn lecture_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<LectureCreateBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let course = find_course(&state, &ctx, course_id).await?;
    let created = Lecture::create(
        state.pool(),
        ctx.user()?,
        LectureCreate {
            course_id: course.id(),
            title: payload.title,
            description: payload.description,
            notes_md: payload.notes_md,
            order_index: payload.order_index,
            video_key: payload.video_key,
            storage_provider_id: payload.storage_provider_id,
        },
    )
    .await
    .map_err(|e| {
        if e.is_foreign_key_violation() {
            WebError::bad_request("Unknown storage provider")
        } else {
            WebError::from_db(Lecture::get_resource_type(), e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/lectures/{id}",
    params(("id" = Uuid, Path, description = "Lecture id")),
    request_body = LectureUpdateBody,
    responses(
        (status = 200, description = "Lecture updated", body = Lecture),
        (status = 400, description = "Validation error, empty body or foreign notes attachment", body = ErrorResponse),
        (status = 404, description = "Lecture not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn lecture_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LectureUpdateBody>,
) -> WebResult<impl IntoResponse> {
    if payload.is_empty() {
        return Err(WebError::no_fields_to_update());
    }
    payload.validate()?;

    let found = find_lecture(&state, &ctx, id).await?;

    if let Some(Some(attachment_id)) = payload.notes_attachment_id {
        let attachment = Attachment::find_by_id(state.pool(), attachment_id)
            .await
            .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?;

        if attachment.is_none_or(|a| a.course_id() != found.course_id()) {
            return Err(WebError::bad_request(
                "Notes attachment must belong to the lecture's course",
            ));
        }
    }

    let updated = found
        .update(
            state.pool(),
            ctx.user()?,
            LectureUpdate {
                title: payload.title,
                description: payload.description,
                notes_md: payload.notes_md,
                notes_attachment_id: payload.notes_attachment_id,
                order_index: payload.order_index,
                video_key: payload.video_key,
                storage_provider_id: payload.storage_provider_id,
            },
        )
        .await
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                WebError::bad_request("Unknown storage provider")
            } else {
                WebError::from_db(Lecture::get_resource_type(), e)
            }
        })?;

    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/lectures/{id}",
    params(("id" = Uuid, Path, description = "Lecture id")),
    responses(
        (status = 200, description = "Lecture deleted", body = OkResponse),
        (status = 404, description = "Lecture not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn lecture_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let found = find_lecture(&state, &ctx, id).await?;

    found
        .delete(state.pool(), ctx.user()?)
        .await
        .map_err(|e| WebError::from_db(Lecture::get_resource_type(), e))?;

    Ok(Json(OkResponse::ok()))
}
