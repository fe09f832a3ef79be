//! Room repository interface

use async_trait::async_trait;

use super::model::{NewRoom, Room, RoomType};
use crate::shared::errors::DomainResult;

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Insert a room; a clashing room number fails with `Conflict`
    async fn insert(&self, room: NewRoom) -> DomainResult<Room>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Room>>;

    /// All rooms, newest first, optionally restricted to one type
    async fn find_all(&self, room_type: Option<RoomType>) -> DomainResult<Vec<Room>>;

    /// Persist every mutable field of an existing room
    async fn update(&self, room: Room) -> DomainResult<Room>;

    /// Delete a room unless a BOOKED booking still references it (`Conflict`)
    async fn delete_unbooked(&self, id: i32) -> DomainResult<()>;
}
