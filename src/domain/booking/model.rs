//! Booking domain entity

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::stay::StayDates;
use crate::shared::errors::{DomainError, DomainResult};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Holds the room for its nights
    Booked,
    Cancelled,
    /// Stay finished
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booked => "BOOKED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOKED" => Ok(Self::Booked),
            "CANCELLED" => Ok(Self::Cancelled),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(DomainError::Validation(format!(
                "unknown booking status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            other => Err(DomainError::Validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A room held for a guest over `[check_in, check_out)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: i32,
    /// Public reference code, immutable once assigned
    pub reference: String,
    /// Owning user (identity subject)
    pub user_id: String,
    /// Contact address for notifications
    pub user_email: String,
    pub room_id: i32,
    pub check_in: NaiveDate,
    /// Exclusive
    pub check_out: NaiveDate,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn stay(&self) -> DomainResult<StayDates> {
        StayDates::new(self.check_in, self.check_out)
    }

    pub fn is_booked(&self) -> bool {
        self.booking_status == BookingStatus::Booked
    }

    /// Payment status after a gateway outcome. A failure never downgrades a
    /// booking that is already paid.
    pub fn settled_status(&self, success: bool) -> PaymentStatus {
        match (success, self.payment_status) {
            (true, _) => PaymentStatus::Completed,
            (false, PaymentStatus::Completed) => PaymentStatus::Completed,
            (false, _) => PaymentStatus::Failed,
        }
    }
}

/// Everything needed to insert a booking except the reference code and
/// price, which are fixed inside the reserving transaction.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub user_id: String,
    pub user_email: String,
    pub room_id: i32,
    pub stay: StayDates,
}

/// Admin edit of a booking. Present fields override, absent fields are left
/// untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingPatch {
    pub booking_status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl BookingPatch {
    /// Nothing to change
    pub fn is_empty(&self) -> bool {
        self.booking_status.is_none() && self.payment_status.is_none()
    }

    pub fn apply(&self, booking: &mut Booking) {
        if let Some(status) = self.booking_status {
            booking.booking_status = status;
        }
        if let Some(status) = self.payment_status {
            booking.payment_status = status;
        }
    }
}
