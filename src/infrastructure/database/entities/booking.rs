//! Booking entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub reference: String,

    pub user_id: String,
    pub user_email: String,
    pub room_id: i32,

    pub check_in: Date,
    /// Exclusive
    pub check_out: Date,

    /// BOOKED, CANCELLED, COMPLETED
    pub booking_status: String,

    /// PENDING, COMPLETED, FAILED
    pub payment_status: String,

    pub total_price_cents: i64,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
    #[sea_orm(has_many = "super::room_night::Entity")]
    RoomNights,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::room_night::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomNights.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
