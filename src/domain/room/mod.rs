//! Room aggregate
//!
//! Contains the Room entity, its partial-update patch, and repository interface.

pub mod model;
pub mod repository;

pub use model::{NewRoom, Room, RoomPatch, RoomType};
pub use repository::RoomRepository;
