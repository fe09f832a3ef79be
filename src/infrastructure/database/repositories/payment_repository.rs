//! SeaORM implementation of PaymentRepository

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::booking_repository::model_to_domain as booking_model_to_domain;
use super::{unique_violation, WriteGate};
use crate::domain::money::{from_minor_units, to_minor_units};
use crate::domain::payment::{
    OutcomeReport, PaymentOutcome, PaymentRecord, PaymentRepository, RecordedOutcome,
};
use crate::infrastructure::database::entities::{booking, payment};
use crate::shared::errors::{DomainError, DomainResult};

pub struct SeaOrmPaymentRepository {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl SeaOrmPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        let gate = WriteGate::for_backend(db.get_database_backend());
        Self::with_gate(db, gate)
    }

    pub(crate) fn with_gate(db: DatabaseConnection, gate: WriteGate) -> Self {
        Self { db, gate }
    }
}

fn model_to_domain(m: payment::Model) -> DomainResult<PaymentRecord> {
    Ok(PaymentRecord {
        id: m.id,
        booking_reference: m.booking_reference,
        gateway: m.gateway,
        transaction_id: m.transaction_id,
        amount: from_minor_units(m.amount_cents),
        outcome: PaymentOutcome::from_str(&m.outcome)?,
        failure_reason: m.failure_reason,
        user_id: m.user_id,
        recorded_at: m.recorded_at,
    })
}

#[async_trait]
impl PaymentRepository for SeaOrmPaymentRepository {
    async fn record_outcome(
        &self,
        report: &OutcomeReport,
        gateway: &str,
    ) -> DomainResult<RecordedOutcome> {
        let _write = self.gate.enter().await;
        let txn = self.db.begin().await?;

        if let Some(existing) = payment::Entity::find()
            .filter(payment::Column::TransactionId.eq(report.transaction_id.as_str()))
            .one(&txn)
            .await?
        {
            return Ok(RecordedOutcome::Duplicate(model_to_domain(existing)?));
        }

        let found = booking::Entity::find()
            .filter(booking::Column::Reference.eq(report.booking_reference.as_str()))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                DomainError::not_found("Booking", "reference", &report.booking_reference)
            })?;
        let mut current = booking_model_to_domain(found)?;

        let outcome = PaymentOutcome::from_success(report.success);
        let record = payment::ActiveModel {
            booking_reference: Set(report.booking_reference.clone()),
            gateway: Set(gateway.to_string()),
            transaction_id: Set(report.transaction_id.clone()),
            amount_cents: Set(to_minor_units(report.amount)?),
            outcome: Set(outcome.as_str().to_string()),
            failure_reason: Set(report.failure_reason.clone()),
            user_id: Set(current.user_id.clone()),
            recorded_at: Set(Utc::now()),
            ..Default::default()
        };

        let saved = match record.insert(&txn).await {
            Ok(saved) => saved,
            Err(e) if unique_violation(&e).is_some() => {
                // A concurrent delivery of the same transaction won the race.
                drop(txn);
                debug!(transaction_id = %report.transaction_id, "Lost duplicate delivery race");
                let existing = payment::Entity::find()
                    .filter(payment::Column::TransactionId.eq(report.transaction_id.as_str()))
                    .one(&self.db)
                    .await?
                    .ok_or_else(|| DomainError::from(e))?;
                return Ok(RecordedOutcome::Duplicate(model_to_domain(existing)?));
            }
            Err(e) => return Err(e.into()),
        };

        let settled = current.settled_status(report.success);
        if settled != current.payment_status {
            let update = booking::ActiveModel {
                id: Set(current.id),
                payment_status: Set(settled.as_str().to_string()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            };
            current = booking_model_to_domain(update.update(&txn).await?)?;
        }

        txn.commit().await?;

        info!(
            booking_reference = %current.reference,
            transaction_id = %report.transaction_id,
            outcome = %outcome,
            payment_status = %current.payment_status,
            "Payment outcome recorded"
        );

        Ok(RecordedOutcome::Applied {
            booking: current,
            payment: model_to_domain(saved)?,
        })
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> DomainResult<Option<PaymentRecord>> {
        payment::Entity::find()
            .filter(payment::Column::TransactionId.eq(transaction_id))
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_booking_reference(
        &self,
        reference: &str,
    ) -> DomainResult<Vec<PaymentRecord>> {
        payment::Entity::find()
            .filter(payment::Column::BookingReference.eq(reference))
            .order_by_asc(payment::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }
}
