//! Room domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::money::validate_amount;
use crate::domain::stay::StayDates;
use crate::shared::errors::{DomainError, DomainResult};

/// Room category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Single,
    Double,
    Triple,
    Suite,
}

impl RoomType {
    pub const ALL: [RoomType; 4] = [Self::Single, Self::Double, Self::Triple, Self::Suite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "SINGLE",
            Self::Double => "DOUBLE",
            Self::Triple => "TRIPLE",
            Self::Suite => "SUITE",
        }
    }
}

impl FromStr for RoomType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::Validation(format!("unknown room type: {s}")))
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bookable room. One unit per room number.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: i32,
    /// Unique, human-facing room number
    pub room_number: i32,
    pub room_type: RoomType,
    pub price_per_night: Decimal,
    /// Maximum number of guests
    pub capacity: i32,
    pub description: Option<String>,
    /// Reference into the external image store
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Price of `stay` at this room's nightly rate.
    pub fn quote(&self, stay: &StayDates) -> Decimal {
        self.price_per_night * Decimal::from(stay.nights())
    }

    /// Case-insensitive containment over number, type and description.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.room_number.to_string().contains(&needle)
            || self.room_type.as_str().to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// Fields for a room that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub room_number: i32,
    pub room_type: RoomType,
    pub price_per_night: Decimal,
    pub capacity: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl NewRoom {
    pub fn validate(&self) -> DomainResult<()> {
        validate_room_number(self.room_number)?;
        validate_amount("price_per_night", self.price_per_night)?;
        validate_capacity(self.capacity)
    }
}

/// Partial update for a room: a present field overrides, an absent field
/// leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct RoomPatch {
    pub room_number: Option<i32>,
    pub room_type: Option<RoomType>,
    pub price_per_night: Option<Decimal>,
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl RoomPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(number) = self.room_number {
            validate_room_number(number)?;
        }
        if let Some(price) = self.price_per_night {
            validate_amount("price_per_night", price)?;
        }
        if let Some(capacity) = self.capacity {
            validate_capacity(capacity)?;
        }
        if self.description.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err(DomainError::Validation("description cannot be blank".into()));
        }
        Ok(())
    }

    pub fn apply(self, room: &mut Room) {
        if let Some(number) = self.room_number {
            room.room_number = number;
        }
        if let Some(room_type) = self.room_type {
            room.room_type = room_type;
        }
        if let Some(price) = self.price_per_night {
            room.price_per_night = price;
        }
        if let Some(capacity) = self.capacity {
            room.capacity = capacity;
        }
        if let Some(description) = self.description {
            room.description = Some(description);
        }
        if let Some(image_url) = self.image_url {
            room.image_url = Some(image_url);
        }
    }
}

fn validate_room_number(number: i32) -> DomainResult<()> {
    if number < 0 {
        return Err(DomainError::Validation("room_number cannot be negative".into()));
    }
    Ok(())
}

fn validate_capacity(capacity: i32) -> DomainResult<()> {
    if capacity <= 0 {
        return Err(DomainError::Validation("capacity must be positive".into()));
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────
