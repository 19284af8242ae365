use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::{
        ResourceTyped,
        entity::{Attachment, AttachmentCreate},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{OkResponse, SignedUrlResponse},
        error::ErrorResponse,
        routes::{
            admin::{courses::find_course, lectures::find_lecture},
            attachments::signed_download_url,
        },
    },
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct AttachmentCreateBody {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub file_key: String,
    #[validate(length(min = 1))]
    pub mime_type: String,
    #[validate(range(min = 1))]
    pub size_bytes: Option<i64>,
    pub storage_provider_id: Option<Uuid>,
}

impl AttachmentCreateBody {
    fn into_create(self, course_id: Uuid, lecture_id: Option<Uuid>) -> AttachmentCreate {
        AttachmentCreate {
            course_id,
            lecture_id,
            title: self.title,
            file_key: self.file_key,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            storage_provider_id: self.storage_provider_id,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/attachments/courses/{id}",
            get(admin_course_attachments_handler).post(course_attachment_create_handler),
        )
        .route(
            "/attachments/lectures/{id}",
            get(admin_lecture_attachments_handler).post(lecture_attachment_create_handler),
        )
        .route("/attachments/{id}", delete(attachment_delete_handler))
        .route(
            "/attachments/{id}/download-url",
            get(admin_attachment_download_url_handler),
        )
}

async fn find_attachment(state: &AppState, id: Uuid) -> WebResult<Attachment> {
    Attachment::find_by_id(state.pool(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Attachment::get_resource_type()))
}

async fn insert(state: &AppState, data: AttachmentCreate) -> WebResult<Attachment> {
    Attachment::create(state.pool(), data).await.map_err(|e| {
        if e.is_foreign_key_violation() {
            WebError::bad_request("Unknown storage provider")
        } else {
            WebError::resource_fetch_error(Attachment::get_resource_type(), e)
        }
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/attachments/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course-level attachments", body = Vec<Attachment>),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn admin_course_attachments_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = find_course(&state, &ctx, id).await?;

    let attachments = Attachment::list_for_course(state.pool(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?;

    Ok(Json(attachments))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/attachments/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = AttachmentCreateBody,
    responses(
        (status = 201, description = "Attachment created", body = Attachment),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn course_attachment_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachmentCreateBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let course = find_course(&state, &ctx, id).await?;
    let created = insert(&state, payload.into_create(course.id(), None)).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/attachments/lectures/{id}",
    params(("id" = Uuid, Path, description = "Lecture id")),
    responses(
        (status = 200, description = "Lecture attachments", body = Vec<Attachment>),
        (status = 404, description = "Lecture not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn admin_lecture_attachments_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let lecture = find_lecture(&state, &ctx, id).await?;

    let attachments = Attachment::list_for_lecture(state.pool(), lecture.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?;

    Ok(Json(attachments))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/attachments/lectures/{id}",
    params(("id" = Uuid, Path, description = "Lecture id")),
    request_body = AttachmentCreateBody,
    responses(
        (status = 201, description = "Attachment created in the lecture's course", body = Attachment),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Lecture not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn lecture_attachment_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachmentCreateBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let lecture = find_lecture(&state, &ctx, id).await?;
    let created = insert(
        &state,
        payload.into_create(lecture.course_id(), Some(lecture.id())),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment id")),
    responses(
        (status = 200, description = "Attachment deleted", body = OkResponse),
        (status = 404, description = "Attachment not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn attachment_delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let found = find_attachment(&state, id).await?;

    found
        .delete(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?;

    Ok(Json(OkResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/attachments/{id}/download-url",
    params(("id" = Uuid, Path, description = "Attachment id")),
    responses(
        (status = 200, description = "Signed URL", body = SignedUrlResponse),
        (status = 404, description = "Attachment not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn admin_attachment_download_url_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let attachment = find_attachment(&state, id).await?;
    signed_download_url(&state, &attachment).await.map(Json)
}
