use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{ResourceTyped, entity::Attachment},
    storage,
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{SignedUrlResponse, attachments::AttachmentListResponse},
        error::ErrorResponse,
        middlewares,
        routes::{require_course_access, require_lecture_access},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/courses/{id}", get(course_attachments_handler))
        .route("/lectures/{id}", get(lecture_attachments_handler))
        .route("/{id}/download-url", get(attachment_download_url_handler))
        .route_layer(middleware::from_fn(middlewares::require_user_fn))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/attachments/courses/{id}",
    description = "Course-level attachments of an assigned course",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Attachments", body = AttachmentListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Course not assigned", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "attachments",
    security(("bearer" = []))
)]
async fn course_attachments_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = require_course_access(&state, user, id).await?;

    let attachments = Attachment::list_for_course(state.pool(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?;

    Ok(Json(AttachmentListResponse::new(&attachments)))
}

#[utoipa::path(
    get,
    path = "/api/v1/attachments/lectures/{id}",
    description = "Attachments of a lecture in an assigned course",
    params(("id" = Uuid, Path, description = "Lecture id")),
    responses(
        (status = 200, description = "Attachments", body = AttachmentListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Course not assigned", body = ErrorResponse),
        (status = 404, description = "Lecture not found", body = ErrorResponse),
    ),
    tag = "attachments",
    security(("bearer" = []))
)]
async fn lecture_attachments_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lecture = require_lecture_access(&state, user, id).await?;

    let attachments = Attachment::list_for_lecture(state.pool(), lecture.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?;

    Ok(Json(AttachmentListResponse::new(&attachments)))
}

#[utoipa::path(
    get,
    path = "/api/v1/attachments/{id}/download-url",
    description = "Signed download URL for an attachment of an assigned course",
    params(("id" = Uuid, Path, description = "Attachment id")),
    responses(
        (status = 200, description = "Signed URL", body = SignedUrlResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Course not assigned", body = ErrorResponse),
        (status = 404, description = "Attachment not found", body = ErrorResponse),
    ),
    tag = "attachments",
    security(("bearer" = []))
)]
async fn attachment_download_url_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let attachment = Attachment::find_by_id(state.pool(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Attachment::get_resource_type()))?;

    require_course_access(&state, user, attachment.course_id()).await?;

    signed_download_url(&state, &attachment).await.map(Json)
}

pub(crate) async fn signed_download_url(
    state: &AppState,
    attachment: &Attachment,
) -> WebResult<SignedUrlResponse> {
    let provider = storage::resolve_provider(
        state.pool(),
        state.config(),
        attachment.storage_provider_id(),
    )
    .await?;
    let url =
        storage::sign_stream_url(&provider, attachment.file_key(), storage::DOWNLOAD_URL_TTL)
            .await?;

    Ok(SignedUrlResponse {
        url,
        expires_in_seconds: storage::DOWNLOAD_URL_TTL.as_secs(),
    })
}
