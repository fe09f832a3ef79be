//! Create rooms table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rooms::RoomNumber).integer().not_null())
                    .col(ColumnDef::new(Rooms::RoomType).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Rooms::PricePerNightCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rooms::Capacity).integer().not_null())
                    .col(ColumnDef::new(Rooms::Description).text())
                    .col(ColumnDef::new(Rooms::ImageUrl).string())
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_room_number")
                    .table(Rooms::Table)
                    .col(Rooms::RoomNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_room_type")
                    .table(Rooms::Table)
                    .col(Rooms::RoomType)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Rooms {
    Table,
    Id,
    RoomNumber,
    RoomType,
    PricePerNightCents,
    Capacity,
    Description,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}
