use std::time::Duration;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    storage,
    web::{AppState, WebResult, dto::PresignResponse, error::ErrorResponse},
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct PresignBody {
    #[validate(length(min = 1))]
    pub key: String,
    #[validate(length(min = 1))]
    pub content_type: String,
    pub provider_id: Option<Uuid>,
    /// Defaults to 300, at most 1800.
    #[validate(range(min = 1, max = 1800))]
    pub expires_in_seconds: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/uploads/presign", post(presign_upload_handler))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/uploads/presign",
    description = "Presigned PUT so the browser uploads straight to the bucket",
    request_body = PresignBody,
    responses(
        (status = 200, description = "Upload URL", body = PresignResponse),
        (status = 400, description = "Validation error or inactive provider", body = ErrorResponse),
        (status = 404, description = "Storage provider not found", body = ErrorResponse),
        (status = 500, description = "Storage not configured", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn presign_upload_handler(
    State(state): State<AppState>,
    Json(payload): Json<PresignBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let expires_in = payload
        .expires_in_seconds
        .map(Duration::from_secs)
        .unwrap_or(storage::UPLOAD_URL_TTL)
        .min(storage::MAX_UPLOAD_URL_TTL);

    let provider =
        storage::resolve_provider(state.pool(), state.config(), payload.provider_id).await?;
    let url =
        storage::sign_upload_url(&provider, &payload.key, &payload.content_type, expires_in).await?;

    Ok(Json(PresignResponse {
        url,
        key: payload.key,
    }))
}
