//! Room availability and search
//!
//! Reads only. The authoritative check for a new booking is repeated inside
//! the reserving transaction; answers from here may be stale by the time a
//! client acts on them.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::repositories::RepositoryProvider;
use crate::domain::room::{Room, RoomType};
use crate::domain::stay::StayDates;
use crate::shared::clock::Clock;
use crate::shared::errors::{DomainError, DomainResult};

pub struct AvailabilityChecker {
    repos: Arc<dyn RepositoryProvider>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityChecker {
    pub fn new(repos: Arc<dyn RepositoryProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    /// Whether no BOOKED booking on `room_id` overlaps `[check_in, check_out)`.
    pub async fn is_available(
        &self,
        room_id: i32,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> DomainResult<bool> {
        let stay = StayDates::new(check_in, check_out)?;
        if self.repos.rooms().find_by_id(room_id).await?.is_none() {
            return Err(DomainError::not_found("Room", "id", room_id));
        }
        let overlapping = self
            .repos
            .bookings()
            .find_booked_overlapping(Some(room_id), &stay)
            .await?;
        Ok(overlapping.is_empty())
    }

    /// Rooms free for the whole stay, newest first, optionally of one type.
    /// The stay is validated like a new booking request.
    pub async fn list_available(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_type: Option<RoomType>,
    ) -> DomainResult<Vec<Room>> {
        let stay = StayDates::upcoming(check_in, check_out, self.clock.today())?;

        let taken: HashSet<i32> = self
            .repos
            .bookings()
            .find_booked_overlapping(None, &stay)
            .await?
            .into_iter()
            .map(|b| b.room_id)
            .collect();

        let rooms = self.repos.rooms().find_all(room_type).await?;
        Ok(rooms.into_iter().filter(|r| !taken.contains(&r.id)).collect())
    }

    /// Case-insensitive text match over room number, type and description.
    pub async fn search(&self, text: &str) -> DomainResult<Vec<Room>> {
        let rooms = self.repos.rooms().find_all(None).await?;
        Ok(rooms.into_iter().filter(|r| r.matches_text(text)).collect())
    }
}
