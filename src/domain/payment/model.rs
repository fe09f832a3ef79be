//! Payment domain entities

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::booking::Booking;
use crate::shared::errors::DomainError;

/// Gateway identifier stored on every record
pub const GATEWAY_STRIPE: &str = "STRIPE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Completed,
    Failed,
}

impl PaymentOutcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            Self::Completed
        } else {
            Self::Failed
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl FromStr for PaymentOutcome {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            other => Err(DomainError::Validation(format!(
                "unknown payment outcome: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for PaymentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One gateway outcome. Never mutated after insert.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub id: i32,
    pub booking_reference: String,
    /// Gateway identifier, e.g. [`GATEWAY_STRIPE`]
    pub gateway: String,
    /// Gateway transaction id, unique across all records
    pub transaction_id: String,
    pub amount: Decimal,
    pub outcome: PaymentOutcome,
    pub failure_reason: Option<String>,
    /// Owner of the paid booking
    pub user_id: String,
    pub recorded_at: DateTime<Utc>,
}

/// Outcome reported by the payment provider.
#[derive(Debug, Clone)]
pub struct OutcomeReport {
    pub booking_reference: String,
    pub transaction_id: String,
    pub amount: Decimal,
    pub success: bool,
    pub failure_reason: Option<String>,
}

/// Result of recording an outcome
#[derive(Debug, Clone)]
pub enum RecordedOutcome {
    /// First delivery of this transaction id; booking updated
    Applied {
        booking: Booking,
        payment: PaymentRecord,
    },
    /// Transaction id already recorded; nothing changed
    Duplicate(PaymentRecord),
}
