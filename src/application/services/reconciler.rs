//! Payment reconciliation
//!
//! Creates provider charge intents for bookings and applies the provider's
//! asynchronous outcomes. Outcome application is idempotent per gateway
//! transaction id: the payments table's unique index decides which delivery
//! wins, and only that delivery notifies the guest.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::application::ports::{GatewayError, PaymentGateway, PaymentIntentRequest};
use crate::domain::booking::PaymentStatus;
use crate::domain::identity::Identity;
use crate::domain::money::{to_minor_units, validate_amount};
use crate::domain::payment::{OutcomeReport, PaymentOutcome, RecordedOutcome};
use crate::domain::repositories::RepositoryProvider;
use crate::notifications::{NotificationRequest, Notifier};
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::retry::{retry_transient, RetryConfig};

#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    /// ISO 4217, lowercase
    pub currency: String,
    /// Upper bound for one payment gateway call
    pub gateway_timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            gateway_timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

pub struct PaymentReconciler {
    repos: Arc<dyn RepositoryProvider>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Notifier,
    settings: ReconcilerSettings,
}

impl PaymentReconciler {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Notifier,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            repos,
            gateway,
            notifier,
            settings,
        }
    }

    /// Ask the provider for a charge intent and return its client secret.
    pub async fn create_intent(
        &self,
        identity: &Identity,
        booking_reference: &str,
        amount: Decimal,
    ) -> DomainResult<String> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::Validation("amount must be positive".into()));
        }
        let amount_minor = to_minor_units(amount)?;

        let booking = self
            .repos
            .bookings()
            .find_by_reference(booking_reference)
            .await?
            .filter(|b| identity.can_access(&b.user_id))
            .ok_or_else(|| DomainError::not_found("Booking", "reference", booking_reference))?;

        if booking.payment_status == PaymentStatus::Completed {
            return Err(DomainError::AlreadyPaid {
                reference: booking.reference,
            });
        }

        let request = PaymentIntentRequest {
            booking_reference: booking.reference.clone(),
            amount_minor,
            currency: self.settings.currency.clone(),
        };

        let timeout = self.settings.gateway_timeout;
        let result = match tokio::time::timeout(timeout, self.gateway.create_intent(&request)).await
        {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(timeout.as_secs())),
        };

        match result {
            Ok(intent) => {
                metrics::counter!("payment_intents_total", "result" => "ok").increment(1);
                info!(
                    booking_reference = %booking.reference,
                    intent_id = %intent.id,
                    amount_minor,
                    "Payment intent created"
                );
                Ok(intent.client_secret)
            }
            Err(e) => {
                metrics::counter!("payment_intents_total", "result" => "error").increment(1);
                warn!(
                    booking_reference = %booking.reference,
                    gateway = self.gateway.name(),
                    error = %e,
                    "Payment intent failed"
                );
                Err(DomainError::PaymentProvider(e.to_string()))
            }
        }
    }

    /// Record a provider outcome and settle the booking. Returns `false` when
    /// the transaction id was already recorded and nothing changed.
    pub async fn apply_outcome(&self, report: OutcomeReport) -> DomainResult<bool> {
        if report.transaction_id.trim().is_empty() {
            return Err(DomainError::Validation("transaction_id is required".into()));
        }
        if report.booking_reference.trim().is_empty() {
            return Err(DomainError::Validation("booking_reference is required".into()));
        }
        validate_amount("amount", report.amount)?;

        let recorded = retry_transient(&self.settings.retry, "record_payment_outcome", || {
            self.repos
                .payments()
                .record_outcome(&report, self.gateway.name())
        })
        .await?;

        match recorded {
            RecordedOutcome::Applied { booking, payment } => {
                metrics::counter!("payment_outcomes_total", "outcome" => payment.outcome.as_str())
                    .increment(1);

                let request = match payment.outcome {
                    PaymentOutcome::Completed => Some(NotificationRequest::payment_succeeded(&booking)),
                    // A late failure for a paid booking changes nothing the guest needs to hear.
                    PaymentOutcome::Failed if booking.payment_status == PaymentStatus::Completed => {
                        info!(
                            booking_reference = %booking.reference,
                            transaction_id = %payment.transaction_id,
                            "Failure recorded for an already paid booking"
                        );
                        None
                    }
                    PaymentOutcome::Failed => Some(NotificationRequest::payment_failed(
                        &booking,
                        payment.failure_reason.as_deref(),
                    )),
                };
                if let Some(request) = request {
                    self.notifier.notify(request).await;
                }
                Ok(true)
            }
            RecordedOutcome::Duplicate(existing) => {
                metrics::counter!("payment_outcomes_duplicate_total").increment(1);
                if existing.outcome != PaymentOutcome::from_success(report.success) {
                    warn!(
                        booking_reference = %report.booking_reference,
                        transaction_id = %report.transaction_id,
                        recorded = %existing.outcome,
                        reported = %PaymentOutcome::from_success(report.success),
                        "Replayed outcome disagrees with the recorded one; keeping the first"
                    );
                } else {
                    info!(
                        transaction_id = %report.transaction_id,
                        "Duplicate payment outcome ignored"
                    );
                }
                Ok(false)
            }
        }
    }
}
