//! Create payments table
//!
//! Append-only audit trail of gateway outcomes. The unique index on
//! `transaction_id` makes outcome application idempotent under concurrent
//! duplicate deliveries.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Payments::BookingReference)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::Gateway).string_len(20).not_null())
                    .col(ColumnDef::new(Payments::TransactionId).string().not_null())
                    .col(ColumnDef::new(Payments::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Outcome).string_len(20).not_null())
                    .col(ColumnDef::new(Payments::FailureReason).text())
                    .col(ColumnDef::new(Payments::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Payments::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_transaction_id")
                    .table(Payments::Table)
                    .col(Payments::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_booking_reference")
                    .table(Payments::Table)
                    .col(Payments::BookingReference)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Payments {
    Table,
    Id,
    BookingReference,
    Gateway,
    TransactionId,
    AmountCents,
    Outcome,
    FailureReason,
    UserId,
    RecordedAt,
}
