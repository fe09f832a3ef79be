//! Create issued_references table
//!
//! Every reference code ever handed out, kept after its booking is gone
//! (deleting a room cascades to its finished bookings). Reference generation
//! checks and claims codes here, so a code is never issued twice.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IssuedReferences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IssuedReferences::Reference)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IssuedReferences::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Codes issued before this table existed: live bookings, plus
        // bookings that only survive as payment records.
        let db = manager.get_connection();
        db.execute_unprepared(
            "INSERT INTO issued_references (reference, issued_at) \
             SELECT reference, created_at FROM bookings",
        )
        .await?;
        db.execute_unprepared(
            "INSERT INTO issued_references (reference, issued_at) \
             SELECT booking_reference, MIN(recorded_at) FROM payments \
             WHERE booking_reference NOT IN (SELECT reference FROM issued_references) \
             GROUP BY booking_reference",
        )
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IssuedReferences::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum IssuedReferences {
    Table,
    Reference,
    IssuedAt,
}
