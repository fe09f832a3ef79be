//! Create bookings table
//!
//! `reference` is unique among live bookings. Codes of bookings removed with
//! their room stay reserved in `issued_references`.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_rooms::Rooms;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::Reference).string_len(32).not_null())
                    .col(ColumnDef::new(Bookings::UserId).string().not_null())
                    .col(ColumnDef::new(Bookings::UserEmail).string().not_null())
                    .col(ColumnDef::new(Bookings::RoomId).integer().not_null())
                    .col(ColumnDef::new(Bookings::CheckIn).date().not_null())
                    .col(ColumnDef::new(Bookings::CheckOut).date().not_null())
                    .col(
                        ColumnDef::new(Bookings::BookingStatus)
                            .string_len(20)
                            .not_null()
                            .default("BOOKED"),
                    )
                    .col(
                        ColumnDef::new(Bookings::PaymentStatus)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Bookings::TotalPriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_room")
                            .from(Bookings::Table, Bookings::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_reference")
                    .table(Bookings::Table)
                    .col(Bookings::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_room_status")
                    .table(Bookings::Table)
                    .col(Bookings::RoomId)
                    .col(Bookings::BookingStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bookings {
    Table,
    Id,
    Reference,
    UserId,
    UserEmail,
    RoomId,
    CheckIn,
    CheckOut,
    BookingStatus,
    PaymentStatus,
    TotalPriceCents,
    CreatedAt,
    UpdatedAt,
}
