use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{Coupon, Course, CourseAssignment, Payment, PaymentCreate, UserEntity},
    },
    payments::{
        self, CreateOrderRequest, CustomerDetails, OrderMeta, PaymentError,
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::payments::{
            CashfreeSession, CreateOrderResponse, PaymentRef, PaymentStatusResponse,
        },
        error::ErrorResponse,
        middlewares,
    },
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateOrderBody {
    pub course_id: Uuid,
    #[validate(length(min = 3, max = 32))]
    pub coupon_code: Option<String>,
    #[validate(length(min = 8, max = 20))]
    pub phone: String,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/cashfree/create-order", post(create_order_handler))
        .route("/orders/{order_id}", get(order_status_handler))
        .route_layer(middleware::from_fn(middlewares::require_user_fn))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/cashfree/create-order",
    description = "Starts a course purchase. Free after discount means the course is assigned right away",
    request_body = CreateOrderBody,
    responses(
        (status = 200, description = "Checkout session or free assignment", body = CreateOrderResponse),
        (status = 400, description = "Validation error or coupon rejected", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Course already assigned", body = ErrorResponse),
        (status = 502, description = "Cashfree rejected the order", body = ErrorResponse),
    ),
    tag = "payments",
    security(("bearer" = []))
)]
async fn create_order_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let user = ctx.user()?;
    let course_id = payload.course_id;

    let course = Course::find_by_id(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    let assigned = CourseAssignment::find_by_user_course(state.pool(), user.user_id(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(CourseAssignment::get_resource_type(), e))?;

    if assigned.is_some() {
        return Err(WebError::resource_conflict(
            Course::get_resource_type(),
            "Course already assigned",
        ));
    }

    let now = Utc::now();
    let coupon = match payload.coupon_code.as_deref() {
        Some(code) => {
            let coupon = Coupon::find_by_code(state.pool(), code)
                .await
                .map_err(|e| WebError::resource_fetch_error(Coupon::get_resource_type(), e))?
                .ok_or(PaymentError::InvalidCoupon)?;
            payments::validate_coupon(&coupon, course_id, now)?;
            Some(coupon)
        }
        None => None,
    };

    let payable = payments::payable_paise(course.price_inr_paise(), coupon.as_ref());

    if payable == 0 {
        CourseAssignment::ensure(state.pool().executor(), user.user_id(), course_id)
            .await
            .map_err(|e| WebError::resource_fetch_error(CourseAssignment::get_resource_type(), e))?;

        tracing::info!("course {} granted to {} for free", course_id, user.user_id());
        return Ok(Json(CreateOrderResponse::free()));
    }

    let me = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::auth_required())?;

    let config = state.config();
    let order_id = payments::new_order_id(course_id, now);

    let request = CreateOrderRequest {
        order_id: order_id.clone(),
        order_amount: payments::paise_to_inr(payable),
        order_currency: "INR",
        customer_details: CustomerDetails {
            customer_id: me.id().to_string(),
            customer_email: Some(me.email().to_string()),
            customer_phone: payload.phone,
            customer_name: me.name().map(str::to_string),
        },
        order_meta: OrderMeta {
            return_url: format!(
                "{}/courses/{}?order_id={}",
                config.app().app_base_url().trim_end_matches('/'),
                course_id,
                order_id
            ),
            notify_url: format!(
                "{}/api/v1/webhooks/cashfree",
                config.app().public_backend_url().trim_end_matches('/')
            ),
        },
    };

    let order = state.cashfree().create_order(&request).await?;

    let payment = Payment::create(
        state.pool(),
        PaymentCreate {
            provider_order_id: order_id.clone(),
            user_id: user.user_id(),
            course_id,
            coupon_id: coupon.as_ref().map(Coupon::id),
            amount_paise: payable,
            raw_payload: None,
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(Payment::get_resource_type(), e))?;

    tracing::info!("payment {} created for order {}", payment.id(), order_id);

    Ok(Json(CreateOrderResponse::Checkout {
        payment: PaymentRef {
            id: payment.id(),
            provider_order_id: order_id,
        },
        cashfree: CashfreeSession {
            payment_session_id: order.payment_session_id,
            order_id: order.order_id,
            mode: state.cashfree().mode().to_string(),
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/orders/{order_id}",
    description = "Status of one of the caller's orders",
    params(("order_id" = String, Path, description = "Provider order id")),
    responses(
        (status = 200, description = "Payment status", body = PaymentStatusResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Order belongs to someone else", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse),
    ),
    tag = "payments",
    security(("bearer" = []))
)]
async fn order_status_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let payment = Payment::find_by_provider_order_id(state.pool(), &order_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Payment::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Payment::get_resource_type()))?;

    check_access(state.pool(), user, &payment, user.user_id())
        .await
        .map_err(|e| WebError::from_db(Payment::get_resource_type(), e))?;

    Ok(Json(PaymentStatusResponse::from(&payment)))
}
