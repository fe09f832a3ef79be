//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_rooms;
mod m20250101_000002_create_bookings;
mod m20250101_000003_create_room_nights;
mod m20250101_000004_create_payments;
mod m20250101_000005_create_issued_references;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_rooms::Migration),
            Box::new(m20250101_000002_create_bookings::Migration),
            Box::new(m20250101_000003_create_room_nights::Migration),
            Box::new(m20250101_000004_create_payments::Migration),
            Box::new(m20250101_000005_create_issued_references::Migration),
        ]
    }
}
