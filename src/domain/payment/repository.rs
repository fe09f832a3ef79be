//! Payment repository interface

use async_trait::async_trait;

use super::model::{OutcomeReport, PaymentRecord, RecordedOutcome};
use crate::shared::errors::DomainResult;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// In one transaction: dedupe on the transaction id, append the payment
    /// record and settle the booking's payment status.
    ///
    /// Fails with `NotFound` when the booking reference is unknown.
    async fn record_outcome(
        &self,
        report: &OutcomeReport,
        gateway: &str,
    ) -> DomainResult<RecordedOutcome>;

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> DomainResult<Option<PaymentRecord>>;

    /// Audit trail for one booking, oldest first
    async fn find_by_booking_reference(&self, reference: &str)
        -> DomainResult<Vec<PaymentRecord>>;
}
