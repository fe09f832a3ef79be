//! Payment HTTP handlers
//!
//! `POST /payments/webhook` is called by the provider, not by guests. It is
//! authenticated by an HMAC-SHA256 signature of the raw body, hex encoded in
//! `X-Webhook-Signature`, and carries no bearer token.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use tracing::warn;
use validator::Validate;

use crate::application::PaymentReconciler;
use crate::domain::identity::Identity;
use crate::infrastructure::crypto::signature::verify_signature;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::shared::errors::DomainError;

use super::dto::*;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

#[derive(Clone)]
pub struct PaymentAppState {
    pub reconciler: Arc<PaymentReconciler>,
    /// Shared secret for webhook signatures; an empty secret rejects every call
    pub webhook_secret: Arc<str>,
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/intent",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = CreateIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = ApiResponse<IntentResponse>),
        (status = 400, description = "Amount must be positive"),
        (status = 404, description = "No such booking visible to the caller"),
        (status = 409, description = "Booking already paid"),
        (status = 502, description = "Payment provider failure")
    )
)]
pub async fn create_intent(
    State(state): State<PaymentAppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(request): ValidatedJson<CreateIntentRequest>,
) -> Result<Json<ApiResponse<IntentResponse>>, ApiError> {
    let client_secret = state
        .reconciler
        .create_intent(&identity, &request.booking_reference, request.amount)
        .await?;
    Ok(Json(ApiResponse::success(IntentResponse { client_secret })))
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error("UNAUTHORIZED", message)),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    tag = "Payments",
    request_body = PaymentWebhookPayload,
    params(("X-Webhook-Signature" = String, Header, description = "Hex HMAC-SHA256 of the raw body")),
    responses(
        (status = 200, description = "Outcome accepted", body = ApiResponse<WebhookAck>),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "Missing or invalid signature"),
        (status = 404, description = "Unknown booking reference")
    )
)]
pub async fn payment_webhook(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if state.webhook_secret.is_empty() {
        warn!("Payment webhook called but no webhook secret is configured");
        return unauthorized("webhook signature cannot be verified");
    }
    if !verify_signature(&state.webhook_secret, &body, signature) {
        warn!("Payment webhook rejected: bad signature");
        return unauthorized("invalid webhook signature");
    }

    let payload: PaymentWebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return ApiError(DomainError::Validation(format!("invalid payload: {e}")))
                .into_response()
        }
    };
    if let Err(e) = payload.validate() {
        return ApiError(DomainError::Validation(e.to_string())).into_response();
    }

    match state.reconciler.apply_outcome(payload.into()).await {
        Ok(applied) => Json(ApiResponse::success(WebhookAck { applied })).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}
