use serde::{Deserialize, Serialize};

use crate::{
    config,
    payments::{PaymentError, PaymentResult},
};

#[derive(Debug, Serialize)]
pub struct CustomerDetails {
    pub customer_id: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderMeta {
    pub return_url: String,
    pub notify_url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderRequest {
    pub order_id: String,
    pub order_amount: f64,
    pub order_currency: &'static str,
    pub customer_details: CustomerDetails,
    pub order_meta: OrderMeta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub cf_order_id: Option<serde_json::Value>,
    pub order_id: String,
    #[serde(default)]
    pub order_status: Option<String>,
    pub payment_session_id: String,
}

/// Thin client for the Cashfree PG orders API.
#[derive(Debug, Clone)]
pub struct CashfreeClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    api_version: String,
    production: bool,
}

impl CashfreeClient {
    pub fn new(config: &config::Cashfree) -> Self {
        Self::with_base_url(config, config.base_url())
    }

    pub fn with_base_url(config: &config::Cashfree, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id().to_string(),
            client_secret: config.client_secret().to_string(),
            api_version: config.api_version().to_string(),
            production: config.is_production(),
        }
    }

    /// `production` or `sandbox`, for the checkout SDK on the client.
    pub fn mode(&self) -> &'static str {
        if self.production { "production" } else { "sandbox" }
    }

    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    #[tracing::instrument(skip_all, fields(order_id = %request.order_id))]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> PaymentResult<CreateOrderResponse> {
        if !self.is_configured() {
            return Err(PaymentError::NotConfigured);
        }

        let response = self
            .http
            .post(format!("{}/pg/orders", self.base_url))
            .header("x-api-version", &self.api_version)
            .header("x-client-id", &self.client_id)
            .header("x-client-secret", &self.client_secret)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("cashfree rejected order: {} {}", status, body);
            return Err(PaymentError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("cashfree order reply not understood: {}", body);
            PaymentError::UpstreamPayload(e)
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cashfree(raw: &str) -> config::Cashfree {
        toml::from_str(raw).unwrap()
    }

    #[test]
    fn mode_follows_environment() {
        let sandbox = CashfreeClient::new(&cashfree(""));
        assert_eq!(sandbox.mode(), "sandbox");
        assert!(!sandbox.is_configured());

        let prod = CashfreeClient::new(&cashfree(
            r#"
            environment = "PRODUCTION"
            client_id = "id"
            client_secret = "secret"
            "#,
        ));
        assert_eq!(prod.mode(), "production");
        assert!(prod.is_configured());
    }

    fn order_request() -> CreateOrderRequest {
        CreateOrderRequest {
            order_id: "vp_test".into(),
            order_amount: 10.0,
            order_currency: "INR",
            customer_details: CustomerDetails {
                customer_id: "u".into(),
                customer_email: None,
                customer_phone: "9999999999".into(),
                customer_name: None,
            },
            order_meta: OrderMeta {
                return_url: "http://localhost/return".into(),
                notify_url: "http://localhost/notify".into(),
            },
        }
    }

    /// Serves `reply` with status 200 on `/pg/orders` and returns the base url.
    async fn fake_cashfree(reply: serde_json::Value) -> String {
        use axum::{Json, Router, routing::post};

        let app = Router::new().route(
            "/pg/orders",
            post(move || {
                let reply = reply.clone();
                async move { Json(reply) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }

    fn configured() -> config::Cashfree {
        cashfree(
            r#"
            client_id = "id"
            client_secret = "secret"
            "#,
        )
    }

    #[tokio::test]
    async fn malformed_success_reply_is_a_gateway_error() {
        let base = fake_cashfree(serde_json::json!({ "unexpected": true })).await;
        let client = CashfreeClient::with_base_url(&configured(), &base);

        let err = client.create_order(&order_request()).await.unwrap_err();
        assert!(matches!(err, PaymentError::UpstreamPayload(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn order_reply_is_parsed() {
        let base = fake_cashfree(serde_json::json!({
            "cf_order_id": 2149460581u64,
            "order_id": "vp_test",
            "order_status": "ACTIVE",
            "payment_session_id": "session_abc",
        }))
        .await;
        let client = CashfreeClient::with_base_url(&configured(), &base);

        let reply = client.create_order(&order_request()).await.unwrap();
        assert_eq!(reply.order_id, "vp_test");
        assert_eq!(reply.payment_session_id, "session_abc");
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_to_call() {
        let client = CashfreeClient::new(&cashfree(""));
        let request = order_request();

        assert!(matches!(
            client.create_order(&request).await,
            Err(PaymentError::NotConfigured)
        ));
    }
}
