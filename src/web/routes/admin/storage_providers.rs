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
        CrudRepository, DatabaseError, Page, PaginatableRepository, ResourceTyped,
        entity::{StorageProvider, StorageProviderCreate, StorageProviderUpdate},
    },
    storage,
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{OkResponse, double_option},
        error::ErrorResponse,
        routes::PaginationQuery,
    },
};

const NAME_TAKEN: &str = "Storage provider name already exists";
const DEFAULT_RACE: &str = "Another default provider was set concurrently";
const SINGLE_DEFAULT_INDEX: &str = "storage_providers_single_default_idx";

fn write_error(error: DatabaseError) -> WebError {
    let conflict = match error.constraint() {
        Some(SINGLE_DEFAULT_INDEX) => DEFAULT_RACE,
        _ => NAME_TAKEN,
    };
    WebError::from_write(StorageProvider::get_resource_type(), error, conflict)
}

fn default_region() -> String {
    String::from("us-east-1")
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct StorageProviderCreateBody {
    #[validate(length(min = 2))]
    pub name: String,
    #[validate(length(min = 1))]
    pub endpoint: Option<String>,
    #[serde(default = "default_region")]
    #[validate(length(min = 1))]
    pub region: String,
    #[validate(length(min = 1))]
    pub bucket: String,
    #[validate(length(min = 1))]
    pub access_key_id: String,
    #[validate(length(min = 1))]
    pub secret_access_key: String,
    #[serde(default)]
    pub force_path_style: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct StorageProviderUpdateBody {
    #[validate(length(min = 2))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub endpoint: Option<Option<String>>,
    #[validate(length(min = 1))]
    pub region: Option<String>,
    #[validate(length(min = 1))]
    pub bucket: Option<String>,
    #[validate(length(min = 1))]
    pub access_key_id: Option<String>,
    #[validate(length(min = 1))]
    pub secret_access_key: Option<String>,
    pub force_path_style: Option<bool>,
    pub active: Option<bool>,
    pub is_default: Option<bool>,
}

impl StorageProviderUpdateBody {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.endpoint.is_none()
            && self.region.is_none()
            && self.bucket.is_none()
            && self.access_key_id.is_none()
            && self.secret_access_key.is_none()
            && self.force_path_style.is_none()
            && self.active.is_none()
            && self.is_default.is_none()
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/storage-providers",
            get(provider_list_handler).post(provider_create_handler),
        )
        .route(
            "/storage-providers/{id}",
            get(provider_get_handler)
                .patch(provider_update_handler)
                .delete(provider_delete_handler),
        )
}

async fn find_provider(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
) -> WebResult<StorageProvider> {
    StorageProvider::find_by_id(state.pool(), ctx.user()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(StorageProvider::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(StorageProvider::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/storage-providers",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Providers, default first; secrets are never returned", body = Page<StorageProvider>),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn provider_list_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let providers = StorageProvider::page(state.pool(), ctx.user()?, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(StorageProvider::get_resource_type(), e))?;

    Ok(Json(providers))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/storage-providers",
    request_body = StorageProviderCreateBody,
    responses(
        (status = 201, description = "Provider created", body = StorageProvider),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Name taken or concurrent default change", body = ErrorResponse),
        (status = 500, description = "Encryption key missing", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn provider_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<StorageProviderCreateBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let secret_enc = storage::seal_secret(state.config(), &payload.secret_access_key)?;

    let created = StorageProvider::create(
        state.pool(),
        ctx.user()?,
        StorageProviderCreate {
            name: payload.name,
            endpoint: payload.endpoint,
            region: payload.region,
            bucket: payload.bucket,
            access_key_id: payload.access_key_id,
            secret_enc,
            force_path_style: payload.force_path_style,
            active: payload.active,
            is_default: payload.is_default,
        },
    )
    .await
    .map_err(write_error)?;

    tracing::info!("storage provider {} ({}) created", created.name(), created.id());
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/storage-providers/{id}",
    params(("id" = Uuid, Path, description = "Provider id")),
    responses(
        (status = 200, description = "Provider", body = StorageProvider),
        (status = 404, description = "Storage provider not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn provider_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    Ok(Json(find_provider(&state, &ctx, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/storage-providers/{id}",
    params(("id" = Uuid, Path, description = "Provider id")),
    request_body = StorageProviderUpdateBody,
    responses(
        (status = 200, description = "Provider updated", body = StorageProvider),
        (status = 400, description = "Validation error or empty body", body = ErrorResponse),
        (status = 404, description = "Storage provider not found", body = ErrorResponse),
        (status = 409, description = "Name taken or concurrent default change", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn provider_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StorageProviderUpdateBody>,
) -> WebResult<impl IntoResponse> {
    if payload.is_empty() {
        return Err(WebError::no_fields_to_update());
    }
    payload.validate()?;

    let found = find_provider(&state, &ctx, id).await?;

    let secret_enc = payload
        .secret_access_key
        .as_deref()
        .map(|secret| storage::seal_secret(state.config(), secret))
        .transpose()?;

    let updated = found
        .update(
            state.pool(),
            ctx.user()?,
            StorageProviderUpdate {
                name: payload.name,
                endpoint: payload.endpoint,
                region: payload.region,
                bucket: payload.bucket,
                access_key_id: payload.access_key_id,
                secret_enc,
                force_path_style: payload.force_path_style,
                active: payload.active,
                is_default: payload.is_default,
            },
        )
        .await
        .map_err(write_error)?;

    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/storage-providers/{id}",
    params(("id" = Uuid, Path, description = "Provider id")),
    responses(
        (status = 200, description = "Provider deleted; lectures and attachments fall back to the default", body = OkResponse),
        (status = 404, description = "Storage provider not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn provider_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let found = find_provider(&state, &ctx, id).await?;

    found
        .delete(state.pool(), ctx.user()?)
        .await
        .map_err(|e| WebError::from_db(StorageProvider::get_resource_type(), e))?;

    tracing::info!("storage provider {} deleted", id);
    Ok(Json(OkResponse::ok()))
}
