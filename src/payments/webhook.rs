use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer};
use sha2::Sha256;

use crate::payments::{PaymentError, PaymentResult};

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";
pub const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";
pub const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 keyed with `secret` over `timestamp || raw_body`.
fn signed_mac(raw_body: &[u8], timestamp: &str, secret: &str) -> PaymentResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(timestamp.as_bytes());
    mac.update(raw_body);
    Ok(mac)
}

/// `base64(HMAC-SHA256(secret, timestamp || raw_body))`.
pub fn compute_signature(
    raw_body: &[u8],
    timestamp: &str,
    secret: &str,
) -> PaymentResult<String> {
    let mac = signed_mac(raw_body, timestamp, secret)?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verifies over the exact bytes received; the comparison is constant time.
pub fn verify_webhook_signature(
    raw_body: &[u8],
    timestamp: Option<&str>,
    signature: Option<&str>,
    secret: &str,
) -> PaymentResult<()> {
    let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
        return Err(PaymentError::MissingSignatureHeaders);
    };

    if secret.is_empty() {
        return Err(PaymentError::NotConfigured);
    }

    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| PaymentError::InvalidSignature)?;

    signed_mac(raw_body, timestamp, secret)?
        .verify_slice(&expected)
        .map_err(|_| PaymentError::InvalidSignature)
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub event_time: Option<String>,
    #[serde(default)]
    pub data: Option<WebhookData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub order: Option<WebhookOrder>,
    #[serde(default)]
    pub payment: Option<WebhookPayment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookOrder {
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayment {
    #[serde(default, deserialize_with = "string_or_number")]
    pub cf_payment_id: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// What a webhook delivery asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAction {
    MarkPaid,
    MarkFailed,
    StorePayload,
}

impl WebhookPayload {
    pub fn order_id(&self) -> Option<&str> {
        self.data
            .as_ref()?
            .order
            .as_ref()?
            .order_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.data.as_ref()?.payment.as_ref()?.cf_payment_id.as_deref()
    }

    pub fn payment_status(&self) -> Option<&str> {
        self.data
            .as_ref()?
            .payment
            .as_ref()?
            .payment_status
            .as_deref()
    }

    pub fn action(&self) -> WebhookAction {
        match self.payment_status() {
            Some("SUCCESS") => WebhookAction::MarkPaid,
            Some("FAILED") | Some("USER_DROPPED") => WebhookAction::MarkFailed,
            _ => WebhookAction::StorePayload,
        }
    }
}
