//! Notification gateway adapters

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use super::request::NotificationRequest;
use crate::application::ports::{GatewayError, NotificationGateway};

/// Writes notifications to the log. Default when no delivery service is
/// configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotificationGateway;

#[async_trait]
impl NotificationGateway for LogNotificationGateway {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, request: &NotificationRequest) -> Result<(), GatewayError> {
        info!(
            recipient = %request.recipient,
            subject = %request.subject,
            booking_reference = %request.correlation_id,
            "Notification"
        );
        Ok(())
    }
}

/// POSTs each request as JSON to an external delivery service.
#[derive(Debug, Clone)]
pub struct WebhookNotificationGateway {
    client: Client,
    url: String,
}

impl WebhookNotificationGateway {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationGateway for WebhookNotificationGateway {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, request: &NotificationRequest) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Rejected(response.status().to_string()));
        }
        Ok(())
    }
}
