use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::model::entity::{Payment, PaymentStatus};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PaymentRef {
    pub id: Uuid,
    pub provider_order_id: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CashfreeSession {
    pub payment_session_id: String,
    pub order_id: String,
    pub mode: String,
}

/// Either the course was granted right away or a checkout session is open.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum CreateOrderResponse {
    Free { assigned: bool, free: bool },
    Checkout {
        payment: PaymentRef,
        cashfree: CashfreeSession,
    },
}

impl CreateOrderResponse {
    pub fn free() -> Self {
        Self::Free {
            assigned: true,
            free: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PaymentStatusResponse {
    id: Uuid,
    provider_order_id: String,
    provider_payment_id: Option<String>,
    course_id: Uuid,
    amount_paise: i64,
    currency: String,
    status: PaymentStatus,
    created_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentStatusResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id(),
            provider_order_id: payment.provider_order_id().to_string(),
            provider_payment_id: payment.provider_payment_id().map(str::to_string),
            course_id: payment.course_id(),
            amount_paise: payment.amount_paise(),
            currency: payment.currency().to_string(),
            status: payment.status(),
            created_at: payment.created_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct WebhookResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_processed: Option<bool>,
    pub idempotency_key: Option<String>,
}

impl WebhookResponse {
    pub fn ignored() -> Self {
        Self {
            ok: true,
            ignored: Some(true),
            already_processed: None,
            idempotency_key: None,
        }
    }

    pub fn already_processed(idempotency_key: Option<String>) -> Self {
        Self {
            ok: true,
            ignored: None,
            already_processed: Some(true),
            idempotency_key,
        }
    }

    pub fn processed(idempotency_key: Option<String>) -> Self {
        Self {
            ok: true,
            ignored: None,
            already_processed: None,
            idempotency_key,
        }
    }
}
