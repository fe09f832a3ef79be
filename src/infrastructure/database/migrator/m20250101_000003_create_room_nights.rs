//! Create room_nights table
//!
//! One row per occupied night of a BOOKED booking. Two half-open stays on the
//! same room overlap exactly when they share a night, so the unique index on
//! (room_id, night) rejects a second overlapping BOOKED booking no matter
//! which process inserts it.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_rooms::Rooms;
use super::m20250101_000002_create_bookings::Bookings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoomNights::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomNights::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomNights::RoomId).integer().not_null())
                    .col(ColumnDef::new(RoomNights::Night).date().not_null())
                    .col(ColumnDef::new(RoomNights::BookingId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_nights_room")
                            .from(RoomNights::Table, RoomNights::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_nights_booking")
                            .from(RoomNights::Table, RoomNights::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_nights_room_night")
                    .table(RoomNights::Table)
                    .col(RoomNights::RoomId)
                    .col(RoomNights::Night)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_nights_booking")
                    .table(RoomNights::Table)
                    .col(RoomNights::BookingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoomNights::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum RoomNights {
    Table,
    Id,
    RoomId,
    Night,
    BookingId,
}
