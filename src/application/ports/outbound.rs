//! Outbound ports: interfaces to the payment provider and notification
//! delivery.
//!
//! Production adapters live in `infrastructure::payments` and
//! `notifications::gateways`; tests substitute in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::notifications::NotificationRequest;

/// Failure talking to an external gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(String),

    #[error("gateway rejected the request: {0}")]
    Rejected(String),

    #[error("gateway did not answer within {0} seconds")]
    Timeout(u64),

    #[error("gateway is disabled")]
    Disabled,
}

/// Charge intent for one booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    /// Correlates the provider's later webhook with the booking
    pub booking_reference: String,
    /// Amount in minor units (cents)
    pub amount_minor: i64,
    /// ISO 4217, lowercase
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    /// Opaque secret the client uses to confirm the charge
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Identifier stored on payment records (e.g. "STRIPE")
    fn name(&self) -> &'static str;

    async fn create_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError>;
}

/// Fire-and-forget delivery of notification requests
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, request: &NotificationRequest) -> Result<(), GatewayError>;
}
