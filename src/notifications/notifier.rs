//! Best-effort notification dispatch
//!
//! Callers notify only after their write has committed. A slow or failing
//! gateway is cut off by the timeout and logged; it never fails the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::request::NotificationRequest;
use crate::application::ports::{GatewayError, NotificationGateway};

#[derive(Clone)]
pub struct Notifier {
    gateway: Arc<dyn NotificationGateway>,
    timeout: Duration,
}

impl Notifier {
    pub fn new(gateway: Arc<dyn NotificationGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Deliver `request`; returns whether delivery succeeded.
    pub async fn notify(&self, request: NotificationRequest) -> bool {
        let outcome = match tokio::time::timeout(self.timeout, self.gateway.send(&request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.timeout.as_secs())),
        };

        match outcome {
            Ok(()) => {
                metrics::counter!("notifications_sent_total", "result" => "ok").increment(1);
                debug!(
                    gateway = self.gateway.name(),
                    booking_reference = %request.correlation_id,
                    subject = %request.subject,
                    "Notification delivered"
                );
                true
            }
            Err(e) => {
                metrics::counter!("notifications_sent_total", "result" => "error").increment(1);
                warn!(
                    gateway = self.gateway.name(),
                    booking_reference = %request.correlation_id,
                    subject = %request.subject,
                    error = %e,
                    "Notification delivery failed"
                );
                false
            }
        }
    }
}
