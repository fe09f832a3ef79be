//! Booking repository interface

use async_trait::async_trait;

use super::model::{Booking, BookingDraft, BookingPatch};
use super::reference::ReferenceCodeGenerator;
use crate::domain::stay::StayDates;
use crate::shared::errors::DomainResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Atomically re-check availability, price the stay, assign a fresh
    /// reference and insert the booking as BOOKED / PENDING.
    ///
    /// Fails with `NotFound` for an unknown room, `RoomUnavailable` when a
    /// BOOKED booking overlaps, and `ReferenceGenerationExhausted` when every
    /// candidate collided.
    async fn reserve(
        &self,
        draft: BookingDraft,
        references: &ReferenceCodeGenerator,
    ) -> DomainResult<Booking>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>>;

    async fn find_by_reference(&self, reference: &str) -> DomainResult<Option<Booking>>;

    /// All bookings ordered by id
    async fn find_all(&self, newest_first: bool) -> DomainResult<Vec<Booking>>;

    /// Bookings owned by `user_id`, newest first
    async fn find_by_user(&self, user_id: &str) -> DomainResult<Vec<Booking>>;

    /// BOOKED bookings overlapping `stay`, for one room or all rooms
    async fn find_booked_overlapping(
        &self,
        room_id: Option<i32>,
        stay: &StayDates,
    ) -> DomainResult<Vec<Booking>>;

    /// Apply `patch` to booking `id`, releasing or reclaiming its nights when
    /// the booking leaves or re-enters BOOKED
    async fn apply_patch(&self, id: i32, patch: BookingPatch) -> DomainResult<Booking>;
}
