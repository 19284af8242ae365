use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::post,
};

use crate::{
    model::{
        DatabaseError, ResourceTyped,
        entity::{Payment, PaymentStatus},
    },
    payments::{
        IDEMPOTENCY_HEADER, PaymentError, SIGNATURE_HEADER, TIMESTAMP_HEADER, WebhookAction,
        WebhookPayload, verify_webhook_signature,
    },
    web::{AppState, WebError, WebResult, dto::payments::WebhookResponse, error::ErrorResponse},
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/cashfree", post(cashfree_webhook_handler))
        .with_state(state)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn respond(body: WebhookResponse, idempotency_key: Option<&str>) -> Response {
    let mut response = Json(body).into_response();
    if let Some(value) = idempotency_key.and_then(|k| HeaderValue::from_str(k).ok()) {
        response.headers_mut().insert(IDEMPOTENCY_HEADER, value);
    }
    response
}

#[utoipa::path(
    post,
    path = "/api/v1/webhooks/cashfree",
    description = "Cashfree payment notifications. The signature covers the exact raw body",
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Delivery acknowledged", body = WebhookResponse),
        (status = 400, description = "Missing/invalid signature or order id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "webhooks"
)]
async fn cashfree_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebResult<Response> {
    verify_webhook_signature(
        &body,
        header(&headers, TIMESTAMP_HEADER),
        header(&headers, SIGNATURE_HEADER),
        state.config().cashfree().client_secret(),
    )?;

    let idempotency_key = header(&headers, IDEMPOTENCY_HEADER);
    let raw: serde_json::Value =
        serde_json::from_slice(&body).map_err(PaymentError::InvalidPayload)?;
    let payload: WebhookPayload =
        serde_json::from_value(raw.clone()).map_err(PaymentError::InvalidPayload)?;

    let order_id = payload.order_id().ok_or(PaymentError::MissingOrderId)?;

    let Some(payment) = Payment::find_by_provider_order_id(state.pool(), order_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Payment::get_resource_type(), e))?
    else {
        tracing::info!("webhook for unknown order {} ignored", order_id);
        return Ok(respond(WebhookResponse::ignored(), idempotency_key));
    };

    if payment.status() == PaymentStatus::Paid {
        return Ok(respond(
            WebhookResponse::already_processed(idempotency_key.map(str::to_string)),
            idempotency_key,
        ));
    }

    let db_err = |e: DatabaseError| WebError::resource_fetch_error(Payment::get_resource_type(), e);
    match payload.action() {
        WebhookAction::MarkPaid => {
            let applied = payment
                .mark_paid(state.pool(), payload.payment_id(), &raw)
                .await
                .map_err(db_err)?;

            if !applied {
                return Ok(respond(
                    WebhookResponse::already_processed(idempotency_key.map(str::to_string)),
                    idempotency_key,
                ));
            }
            tracing::info!("order {} paid, course {} assigned", order_id, payment.course_id());
        }
        WebhookAction::MarkFailed => {
            payment
                .mark_failed(state.pool(), payload.payment_id(), &raw)
                .await
                .map_err(db_err)?;
            tracing::info!("order {} failed", order_id);
        }
        WebhookAction::StorePayload => {
            payment.store_payload(state.pool(), &raw).await.map_err(db_err)?;
        }
    }

    Ok(respond(
        WebhookResponse::processed(idempotency_key.map(str::to_string)),
        idempotency_key,
    ))
}
