//! Room catalogue administration

use std::sync::Arc;

use tracing::info;

use crate::domain::identity::Identity;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::room::{NewRoom, Room, RoomPatch, RoomType};
use crate::shared::errors::{DomainError, DomainResult};

pub struct RoomCatalog {
    repos: Arc<dyn RepositoryProvider>,
}

impl RoomCatalog {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn add_room(&self, identity: &Identity, room: NewRoom) -> DomainResult<Room> {
        identity.require_admin()?;
        room.validate()?;
        let room = self.repos.rooms().insert(room).await?;
        info!(room_id = room.id, room_number = room.room_number, "Room added");
        Ok(room)
    }

    /// Apply only the fields present in `patch`.
    pub async fn update_room(
        &self,
        identity: &Identity,
        id: i32,
        patch: RoomPatch,
    ) -> DomainResult<Room> {
        identity.require_admin()?;
        patch.validate()?;

        let mut room = self.get_room(id).await?;
        patch.apply(&mut room);
        let room = self.repos.rooms().update(room).await?;
        info!(room_id = room.id, "Room updated");
        Ok(room)
    }

    pub async fn get_room(&self, id: i32) -> DomainResult<Room> {
        self.repos
            .rooms()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", "id", id))
    }

    /// All rooms, newest first
    pub async fn list_rooms(&self) -> DomainResult<Vec<Room>> {
        self.repos.rooms().find_all(None).await
    }

    /// Refused with `Conflict` while any BOOKED booking holds the room.
    pub async fn delete_room(&self, identity: &Identity, id: i32) -> DomainResult<()> {
        identity.require_admin()?;
        self.repos.rooms().delete_unbooked(id).await
    }

    pub fn room_types(&self) -> Vec<RoomType> {
        RoomType::ALL.to_vec()
    }
}
