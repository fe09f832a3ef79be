//! Payment DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::payment::OutcomeReport;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    #[validate(length(min = 1, max = 64))]
    pub booking_reference: String,
    /// Amount to charge in major units
    #[schema(value_type = String, example = "240.00")]
    pub amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
}

/// Outcome notification sent by the payment provider
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhookPayload {
    #[validate(length(min = 1, max = 64))]
    pub booking_reference: String,
    #[validate(length(min = 1, max = 255))]
    pub transaction_id: String,
    #[schema(value_type = String, example = "240.00")]
    pub amount: Decimal,
    pub success: bool,
    pub failure_reason: Option<String>,
}

impl From<PaymentWebhookPayload> for OutcomeReport {
    fn from(p: PaymentWebhookPayload) -> Self {
        Self {
            booking_reference: p.booking_reference,
            transaction_id: p.transaction_id,
            amount: p.amount,
            success: p.success,
            failure_reason: p.failure_reason,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    /// `false` when this transaction id had already been recorded
    pub applied: bool,
}
