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
use validator::{Validate, ValidationError};

use crate::{
    model::{
        CrudRepository, Page, PaginatableRepository, ResourceTyped,
        entity::{Coupon, CouponCreate, CouponUpdate},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{OkResponse, double_option},
        error::ErrorResponse,
        routes::{PaginationQuery, admin::courses::find_course},
    },
};

/// 3 to 32 of `A-Z 0-9 _ -`, any case.
fn validate_coupon_code(code: &str) -> Result<(), ValidationError> {
    let len_ok = (3..=32).contains(&code.len());
    let chars_ok = code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if len_ok && chars_ok {
        Ok(())
    } else {
        Err(ValidationError::new("coupon_code"))
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CouponCreateBody {
    #[validate(custom(function = "validate_coupon_code"))]
    pub code: String,
    pub course_id: Option<Uuid>,
    #[validate(range(min = 1, max = 100))]
    pub percent_off: Option<i32>,
    #[validate(range(min = 1))]
    pub amount_off_paise: Option<i64>,
    pub active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_redemptions: Option<i32>,
}

impl CouponCreateBody {
    fn check_discount(&self) -> WebResult<()> {
        match (self.percent_off, self.amount_off_paise) {
            (Some(_), Some(_)) => Err(WebError::bad_request(
                "Use either percent_off or amount_off_paise",
            )),
            (None, None) => Err(WebError::bad_request("Discount missing")),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CouponUpdateBody {
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub max_redemptions: Option<Option<i32>>,
}

impl CouponUpdateBody {
    fn is_empty(&self) -> bool {
        self.active.is_none() && self.expires_at.is_none() && self.max_redemptions.is_none()
    }

    fn check_redemptions(&self) -> WebResult<()> {
        match self.max_redemptions {
            Some(Some(max)) if max < 1 => {
                Err(WebError::bad_request("max_redemptions must be at least 1"))
            }
            _ => Ok(()),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/coupons", get(coupon_list_handler).post(coupon_create_handler))
        .route(
            "/coupons/{id}",
            get(coupon_get_handler)
                .patch(coupon_update_handler)
                .delete(coupon_delete_handler),
        )
}

async fn find_coupon(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Coupon> {
    Coupon::find_by_id(state.pool(), ctx.user()?, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Coupon::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Coupon::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/coupons",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page", body = Page<Coupon>),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn coupon_list_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let coupons = Coupon::page(state.pool(), ctx.user()?, page.limit(), page.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(Coupon::get_resource_type(), e))?;

    Ok(Json(coupons))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/coupons",
    request_body = CouponCreateBody,
    responses(
        (status = 201, description = "Coupon created", body = Coupon),
        (status = 400, description = "Validation error or bad discount", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Coupon code taken", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn coupon_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CouponCreateBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;
    payload.check_discount()?;

    if let Some(course_id) = payload.course_id {
        find_course(&state, &ctx, course_id).await?;
    }

    let created = Coupon::create(
        state.pool(),
        ctx.user()?,
        CouponCreate {
            code: payload.code,
            course_id: payload.course_id,
            percent_off: payload.percent_off,
            amount_off_paise: payload.amount_off_paise,
            active: payload.active.unwrap_or(true),
            expires_at: payload.expires_at,
            max_redemptions: payload.max_redemptions,
        },
    )
    .await
    .map_err(|e| WebError::from_write(Coupon::get_resource_type(), e, "Coupon code already exists"))?;

    tracing::info!("coupon {} created", created.code());
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 200, description = "Coupon", body = Coupon),
        (status = 404, description = "Coupon not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn coupon_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    Ok(Json(find_coupon(&state, &ctx, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    request_body = CouponUpdateBody,
    responses(
        (status = 200, description = "Coupon updated", body = Coupon),
        (status = 400, description = "Validation error or empty body", body = ErrorResponse),
        (status = 404, description = "Coupon not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn coupon_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CouponUpdateBody>,
) -> WebResult<impl IntoResponse> {
    if payload.is_empty() {
        return Err(WebError::no_fields_to_update());
    }
    payload.check_redemptions()?;

    let found = find_coupon(&state, &ctx, id).await?;
    let updated = found
        .update(
            state.pool(),
            ctx.user()?,
            CouponUpdate {
                active: payload.active,
                expires_at: payload.expires_at,
                max_redemptions: payload.max_redemptions,
            },
        )
        .await
        .map_err(|e| WebError::from_db(Coupon::get_resource_type(), e))?;

    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 200, description = "Coupon deleted", body = OkResponse),
        (status = 404, description = "Coupon not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(("bearer" = []))
)]
async fn coupon_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let found = find_coupon(&state, &ctx, id).await?;

    found
        .delete(state.pool(), ctx.user()?)
        .await
        .map_err(|e| WebError::from_db(Coupon::get_resource_type(), e))?;

    Ok(Json(OkResponse::ok()))
}
