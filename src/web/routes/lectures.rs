use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::{
        ResourceTyped,
        entity::{Attachment, VideoProgress},
    },
    storage,
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            SignedUrlResponse,
            attachments::AttachmentResponse,
            lectures::{LectureDetailResponse, LectureResponse, ProgressResponse, ProgressUpdateResponse},
        },
        error::ErrorResponse,
        middlewares,
        routes::require_lecture_access,
    },
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ProgressBody {
    #[validate(range(min = 0.0, max = 100.0))]
    pub progress_pct: f64,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}", get(lecture_detail_handler))
        .route("/{id}/stream-url", get(lecture_stream_url_handler))
        .route("/{id}/progress", put(lecture_progress_handler))
        .route_layer(middleware::from_fn(middlewares::require_active_plan_fn))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/lectures/{id}",
    description = "Lecture with its notes attachment and the caller's progress",
    params(("id" = Uuid, Path, description = "Lecture id")),
    responses(
        (status = 200, description = "Lecture", body = LectureDetailResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Plan inactive/expired or course not assigned", body = ErrorResponse),
        (status = 404, description = "Lecture not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lectures",
    security(("bearer" = []))
)]
async fn lecture_detail_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lecture = require_lecture_access(&state, user, id).await?;

    let notes_attachment = match lecture.notes_attachment_id() {
        Some(attachment_id) => Attachment::find_by_id(state.pool(), attachment_id)
            .await
            .map_err(|e| WebError::resource_fetch_error(Attachment::get_resource_type(), e))?
            .as_ref()
            .map(AttachmentResponse::from),
        None => None,
    };

    let progress = VideoProgress::find(state.pool(), user.user_id(), lecture.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(VideoProgress::get_resource_type(), e))?;

    Ok(Json(LectureDetailResponse {
        lecture: LectureResponse::new(&lecture, notes_attachment),
        progress: progress.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/lectures/{id}/stream-url",
    description = "Short-lived signed URL for the lecture video",
    params(("id" = Uuid, Path, description = "Lecture id")),
    responses(
        (status = 200, description = "Signed URL", body = SignedUrlResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Plan inactive/expired or course not assigned", body = ErrorResponse),
        (status = 404, description = "Lecture or storage provider not found", body = ErrorResponse),
        (status = 500, description = "Storage not configured", body = ErrorResponse),
    ),
    tag = "lectures",
    security(("bearer" = []))
)]
async fn lecture_stream_url_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lecture = require_lecture_access(&state, user, id).await?;

    let provider =
        storage::resolve_provider(state.pool(), state.config(), lecture.storage_provider_id())
            .await?;
    let url =
        storage::sign_stream_url(&provider, lecture.video_key(), storage::STREAM_URL_TTL).await?;

    Ok(Json(SignedUrlResponse {
        url,
        expires_in_seconds: storage::STREAM_URL_TTL.as_secs(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/lectures/{id}/progress",
    description = "Stores the caller's watch progress (0..=100)",
    params(("id" = Uuid, Path, description = "Lecture id")),
    request_body = ProgressBody,
    responses(
        (status = 200, description = "Progress stored", body = ProgressUpdateResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Plan inactive/expired or course not assigned", body = ErrorResponse),
        (status = 404, description = "Lecture not found", body = ErrorResponse),
    ),
    tag = "lectures",
    security(("bearer" = []))
)]
async fn lecture_progress_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProgressBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let user = ctx.user()?;
    let lecture = require_lecture_access(&state, user, id).await?;

    let progress = VideoProgress::upsert(state.pool(), user.user_id(), lecture.id(), payload.progress_pct)
        .await
        .map_err(|e| WebError::resource_fetch_error(VideoProgress::get_resource_type(), e))?;

    Ok(Json(ProgressUpdateResponse {
        progress: ProgressResponse::from(Some(progress)),
    }))
}
