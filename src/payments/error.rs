use axum::http::StatusCode;
use thiserror::Error;

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("coupon not found")]
    InvalidCoupon,
    #[error("coupon inactive")]
    CouponInactive,
    #[error("coupon expired")]
    CouponExpired,
    #[error("coupon bound to another course")]
    CouponWrongCourse,
    #[error("coupon exhausted")]
    CouponExhausted,
    #[error("cashfree credentials missing")]
    NotConfigured,
    #[error("cashfree responded with {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("cashfree request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("cashfree reply is not a valid order: {0}")]
    UpstreamPayload(serde_json::Error),
    #[error("webhook signature headers missing")]
    MissingSignatureHeaders,
    #[error("webhook signature mismatch")]
    InvalidSignature,
    #[error("webhook signing key rejected: {0}")]
    SigningKey(#[from] hmac::digest::InvalidLength),
    #[error("webhook payload has no order id")]
    MissingOrderId,
    #[error("webhook payload is not valid json: {0}")]
    InvalidPayload(serde_json::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotConfigured | Self::SigningKey(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { .. } | Self::Http(_) | Self::UpstreamPayload(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::InvalidCoupon => String::from("Invalid coupon"),
            Self::CouponInactive => String::from("Coupon inactive"),
            Self::CouponExpired => String::from("Coupon expired"),
            Self::CouponWrongCourse => String::from("Coupon not valid for this course"),
            Self::CouponExhausted => String::from("Coupon exhausted"),
            Self::NotConfigured => String::from("Cashfree not configured"),
            Self::Upstream { body, .. } => format!("Cashfree create order failed: {body}"),
            Self::Http(_) => String::from("Cashfree is unreachable"),
            Self::UpstreamPayload(_) => String::from("Unexpected response from Cashfree"),
            Self::MissingSignatureHeaders => String::from("Missing webhook signature headers"),
            Self::InvalidSignature => String::from("Invalid webhook signature"),
            Self::SigningKey(_) => String::from("Internal server error."),
            Self::MissingOrderId => String::from("Missing order_id"),
            Self::InvalidPayload(_) => String::from("Invalid webhook payload"),
        }
    }
}
