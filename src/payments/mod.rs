//! Course pricing and the Cashfree integration.
//!

mod error;
pub use error::{PaymentError, PaymentResult};

mod pricing;
pub use pricing::{
    MAX_PRICE_PAISE, discount_paise, new_order_id, paise_to_inr, payable_paise, validate_coupon,
};

mod cashfree;
pub use cashfree::{
    CashfreeClient, CreateOrderRequest, CreateOrderResponse, CustomerDetails, OrderMeta,
};

mod webhook;
pub use webhook::{
    IDEMPOTENCY_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER, WebhookAction, WebhookPayload,
    compute_signature, verify_webhook_signature,
};
