//! Room DTOs

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::room::{NewRoom, Room, RoomPatch, RoomType};
use crate::shared::errors::DomainResult;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: i32,
    pub room_number: i32,
    pub room_type: RoomType,
    #[schema(value_type = String, example = "120.00")]
    pub price_per_night: Decimal,
    pub capacity: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Room> for RoomDto {
    fn from(r: Room) -> Self {
        Self {
            id: r.id,
            room_number: r.room_number,
            room_type: r.room_type,
            price_per_night: r.price_per_night,
            capacity: r.capacity,
            description: r.description,
            image_url: r.image_url,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[validate(range(min = 1, message = "must be positive"))]
    pub room_number: i32,
    pub room_type: RoomType,
    #[schema(value_type = String, example = "120.00")]
    pub price_per_night: Decimal,
    #[validate(range(min = 1, message = "must be positive"))]
    pub capacity: i32,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 1024))]
    pub image_url: Option<String>,
}

impl From<CreateRoomRequest> for NewRoom {
    fn from(r: CreateRoomRequest) -> Self {
        Self {
            room_number: r.room_number,
            room_type: r.room_type,
            price_per_night: r.price_per_night,
            capacity: r.capacity,
            description: r.description,
            image_url: r.image_url,
        }
    }
}

/// Partial room update; omitted fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    #[validate(range(min = 1, message = "must be positive"))]
    pub room_number: Option<i32>,
    pub room_type: Option<RoomType>,
    #[schema(value_type = Option<String>, example = "150.00")]
    pub price_per_night: Option<Decimal>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub capacity: Option<i32>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 1024))]
    pub image_url: Option<String>,
}

impl From<UpdateRoomRequest> for RoomPatch {
    fn from(r: UpdateRoomRequest) -> Self {
        Self {
            room_number: r.room_number,
            room_type: r.room_type,
            price_per_night: r.price_per_night,
            capacity: r.capacity,
            description: r.description,
            image_url: r.image_url,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailableRoomsQuery {
    /// First night, `YYYY-MM-DD`
    pub check_in_date: NaiveDate,
    /// Departure day (exclusive), `YYYY-MM-DD`
    pub check_out_date: NaiveDate,
    /// SINGLE, DOUBLE, TRIPLE or SUITE (case-insensitive)
    pub room_type: Option<String>,
}

impl AvailableRoomsQuery {
    pub fn room_type(&self) -> DomainResult<Option<RoomType>> {
        self.room_type
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(RoomType::from_str)
            .transpose()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomSearchQuery {
    /// Matched against room number, type and description
    #[serde(default)]
    pub input: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_type_filter_is_case_insensitive_and_optional() {
        let query = |room_type: Option<&str>| AvailableRoomsQuery {
            check_in_date: NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2030, 1, 4).unwrap(),
            room_type: room_type.map(String::from),
        };

        assert_eq!(query(Some("suite")).room_type().unwrap(), Some(RoomType::Suite));
        assert_eq!(query(None).room_type().unwrap(), None);
        assert_eq!(query(Some(" ")).room_type().unwrap(), None);
        assert!(query(Some("penthouse")).room_type().is_err());
    }

    #[test]
    fn update_request_keeps_absent_fields_absent() {
        let request: UpdateRoomRequest =
            serde_json::from_str(r#"{"pricePerNight": "99.50"}"#).unwrap();
        let patch = RoomPatch::from(request);
        assert_eq!(patch.price_per_night, Some(Decimal::new(9950, 2)));
        assert!(patch.room_number.is_none());
        assert!(patch.room_type.is_none());
    }
}
