//! Booking DTOs
//!
//! Listings use [`BookingSummaryDto`], which leaves out the guest and the
//! room. [`BookingDetailDto`] is only returned by single-booking calls.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::BookingDetail;
use crate::domain::booking::{Booking, BookingPatch, BookingStatus, PaymentStatus};
use crate::interfaces::http::modules::rooms::RoomDto;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "must be a positive room id"))]
    pub room_id: i32,
    /// First night, `YYYY-MM-DD`
    pub check_in_date: NaiveDate,
    /// Departure day (exclusive), `YYYY-MM-DD`
    pub check_out_date: NaiveDate,
}

/// Admin edit; omitted statuses are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    #[validate(range(min = 1, message = "must be a positive booking id"))]
    pub id: i32,
    pub booking_status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl UpdateBookingRequest {
    pub fn patch(&self) -> BookingPatch {
        BookingPatch {
            booking_status: self.booking_status,
            payment_status: self.payment_status,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListBookingsQuery {
    /// Order by creation time, newest first (default) or oldest first
    #[serde(default = "default_newest_first")]
    pub newest_first: bool,
}

fn default_newest_first() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummaryDto {
    pub id: i32,
    pub booking_reference: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    #[schema(value_type = String, example = "240.00")]
    pub total_price: Decimal,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingSummaryDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            booking_reference: b.reference,
            check_in_date: b.check_in,
            check_out_date: b.check_out,
            total_price: b.total_price,
            booking_status: b.booking_status,
            payment_status: b.payment_status,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestDto {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetailDto {
    #[serde(flatten)]
    pub summary: BookingSummaryDto,
    pub guest: GuestDto,
    pub room: RoomDto,
}

impl From<BookingDetail> for BookingDetailDto {
    fn from(detail: BookingDetail) -> Self {
        let guest = GuestDto {
            user_id: detail.booking.user_id.clone(),
            email: detail.booking.user_email.clone(),
        };
        Self {
            summary: detail.booking.into(),
            guest,
            room: detail.room.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults_to_newest_first() {
        let query: ListBookingsQuery = serde_json::from_str("{}").unwrap();
        assert!(query.newest_first);
    }

    #[test]
    fn update_request_maps_to_partial_patch() {
        let request: UpdateBookingRequest =
            serde_json::from_str(r#"{"id": 4, "bookingStatus": "CANCELLED"}"#).unwrap();
        let patch = request.patch();
        assert_eq!(patch.booking_status, Some(BookingStatus::Cancelled));
        assert_eq!(patch.payment_status, None);
    }
}
