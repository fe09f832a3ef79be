//! Notification value object and the messages the core sends.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::booking::Booking;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Email,
    Sms,
}

/// Structured request handed to a notification gateway. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub recipient: String,
    pub channel: Channel,
    pub subject: String,
    pub body: String,
    /// Booking reference this message is about
    pub correlation_id: String,
}

pub const SUBJECT_BOOKING_CONFIRMATION: &str = "Booking Confirmation";
pub const SUBJECT_PAYMENT_SUCCESSFUL: &str = "Booking Payment Successful";
pub const SUBJECT_PAYMENT_FAILED: &str = "Booking Payment Failed";

impl NotificationRequest {
    fn email(booking: &Booking, subject: &str, body: String) -> Self {
        Self {
            recipient: booking.user_email.clone(),
            channel: Channel::Email,
            subject: subject.to_string(),
            body,
            correlation_id: booking.reference.clone(),
        }
    }

    /// Confirmation with a link to pay for the new booking.
    pub fn booking_confirmation(booking: &Booking, payment_link_base: &str) -> Self {
        let link = payment_link(payment_link_base, &booking.reference, booking.total_price);
        let body = format!(
            "Your booking {} from {} to {} has been created. \
             Proceed with your payment of {} using the link below:\n{}",
            booking.reference, booking.check_in, booking.check_out, booking.total_price, link
        );
        Self::email(booking, SUBJECT_BOOKING_CONFIRMATION, body)
    }

    pub fn payment_succeeded(booking: &Booking) -> Self {
        let body = format!(
            "Congratulations! Your payment for booking with reference {} is successful.",
            booking.reference
        );
        Self::email(booking, SUBJECT_PAYMENT_SUCCESSFUL, body)
    }

    pub fn payment_failed(booking: &Booking, reason: Option<&str>) -> Self {
        let body = format!(
            "Your payment for booking with reference {} failed with reason: {}",
            booking.reference,
            reason.unwrap_or("unknown")
        );
        Self::email(booking, SUBJECT_PAYMENT_FAILED, body)
    }
}

fn payment_link(base: &str, reference: &str, amount: Decimal) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), reference, amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{BookingStatus, PaymentStatus};
    use chrono::{NaiveDate, Utc};

    fn booking() -> Booking {
        Booking {
            id: 1,
            reference: "KXQ7M2PA9B".into(),
            user_id: "u".into(),
            user_email: "guest@example.com".into(),
            room_id: 1,
            check_in: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 1, 4).unwrap(),
            booking_status: BookingStatus::Booked,
            payment_status: PaymentStatus::Pending,
            total_price: Decimal::new(30000, 2),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn confirmation_carries_payment_link() {
        let req = NotificationRequest::booking_confirmation(&booking(), "https://hotel.example/payment/");
        assert_eq!(req.subject, SUBJECT_BOOKING_CONFIRMATION);
        assert_eq!(req.recipient, "guest@example.com");
        assert_eq!(req.correlation_id, "KXQ7M2PA9B");
        assert!(req.body.contains("https://hotel.example/payment/KXQ7M2PA9B/300.00"));
    }

    #[test]
    fn failure_names_the_reason() {
        let req = NotificationRequest::payment_failed(&booking(), Some("card declined"));
        assert_eq!(req.subject, SUBJECT_PAYMENT_FAILED);
        assert!(req.body.ends_with("card declined"));
    }
}
