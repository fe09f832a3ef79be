//! SeaORM implementation of RepositoryProvider

use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::domain::booking::BookingRepository;
use crate::domain::payment::PaymentRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::room::RoomRepository;

use super::booking_repository::SeaOrmBookingRepository;
use super::payment_repository::SeaOrmPaymentRepository;
use super::room_repository::SeaOrmRoomRepository;
use super::WriteGate;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
/// All three repositories share one [`WriteGate`], so their transactions
/// never contend for the SQLite write lock.
pub struct SeaOrmRepositoryProvider {
    rooms: SeaOrmRoomRepository,
    bookings: SeaOrmBookingRepository,
    payments: SeaOrmPaymentRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        let gate = WriteGate::for_backend(db.get_database_backend());
        Self {
            rooms: SeaOrmRoomRepository::with_gate(db.clone(), gate.clone()),
            bookings: SeaOrmBookingRepository::with_gate(db.clone(), gate.clone()),
            payments: SeaOrmPaymentRepository::with_gate(db, gate),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn rooms(&self) -> &dyn RoomRepository {
        &self.rooms
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn payments(&self) -> &dyn PaymentRepository {
        &self.payments
    }
}
