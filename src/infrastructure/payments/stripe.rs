//! Stripe PaymentIntents adapter

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::application::ports::{GatewayError, PaymentGateway, PaymentIntent, PaymentIntentRequest};
use crate::domain::payment::GATEWAY_STRIPE;

pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("secret_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(
        secret_key: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn name(&self) -> &'static str {
        GATEWAY_STRIPE
    }

    #[instrument(skip(self, request), fields(booking_reference = %request.booking_reference))]
    async fn create_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        let amount = request.amount_minor.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", request.currency.as_str()),
            ("metadata[booking_reference]", request.booking_reference.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| status.to_string());
            error!(status = %status, error = %message, "Stripe rejected payment intent");
            return Err(GatewayError::Rejected(message));
        }

        let intent: IntentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        debug!(intent_id = %intent.id, "Payment intent created");
        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }
}

/// Used when no provider is configured; every intent fails.
#[derive(Debug, Default, Clone)]
pub struct DisabledPaymentGateway;

#[async_trait]
impl PaymentGateway for DisabledPaymentGateway {
    fn name(&self) -> &'static str {
        "DISABLED"
    }

    async fn create_intent(
        &self,
        _request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        Err(GatewayError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Form, Json, Router};
    use serde_json::{json, Value};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Option<String>, HashMap<String, String>)>>>);

    async fn intents(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Form(form): Form<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let declined = form.get("amount").map(String::as_str) == Some("0");
        captured.0.lock().unwrap().push((auth, form));
        if declined {
            return (
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({"error": {"message": "amount too small"}})),
            );
        }
        (
            StatusCode::OK,
            Json(json!({"id": "pi_123", "client_secret": "pi_123_secret_abc"})),
        )
    }

    /// Stand-in for the provider API on a local port.
    async fn fake_stripe() -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route("/v1/payment_intents", post(intents))
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/"), captured)
    }

    fn request(amount_minor: i64) -> PaymentIntentRequest {
        PaymentIntentRequest {
            booking_reference: "ABCDEFGH23".into(),
            amount_minor,
            currency: "usd".into(),
        }
    }

    #[tokio::test]
    async fn intent_is_tagged_with_the_booking_reference() {
        let (base, captured) = fake_stripe().await;
        let gateway = StripeGateway::new("sk_test_1", base, Duration::from_secs(5)).unwrap();

        let intent = gateway.create_intent(&request(30000)).await.unwrap();
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_abc");

        let calls = captured.0.lock().unwrap();
        let (auth, form) = &calls[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk_test_1"));
        assert_eq!(form["amount"], "30000");
        assert_eq!(form["currency"], "usd");
        assert_eq!(form["metadata[booking_reference]"], "ABCDEFGH23");
    }

    #[tokio::test]
    async fn provider_error_message_is_surfaced() {
        let (base, _) = fake_stripe().await;
        let gateway = StripeGateway::new("sk_test_1", base, Duration::from_secs(5)).unwrap();

        let err = gateway.create_intent(&request(0)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(ref m) if m == "amount too small"));
    }
}
