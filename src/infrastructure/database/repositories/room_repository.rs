//! SeaORM implementation of RoomRepository

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::{unique_violation, WriteGate};
use crate::domain::money::{from_minor_units, to_minor_units};
use crate::domain::room::{NewRoom, Room, RoomRepository, RoomType};
use crate::domain::BookingStatus;
use crate::infrastructure::database::entities::{booking, room};
use crate::shared::errors::{DomainError, DomainResult};

pub struct SeaOrmRoomRepository {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl SeaOrmRoomRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        let gate = WriteGate::for_backend(db.get_database_backend());
        Self::with_gate(db, gate)
    }

    pub(crate) fn with_gate(db: DatabaseConnection, gate: WriteGate) -> Self {
        Self { db, gate }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(super) fn model_to_domain(m: room::Model) -> DomainResult<Room> {
    Ok(Room {
        id: m.id,
        room_number: m.room_number,
        room_type: RoomType::from_str(&m.room_type)?,
        price_per_night: from_minor_units(m.price_per_night_cents),
        capacity: m.capacity,
        description: m.description,
        image_url: m.image_url,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn number_taken(err: sea_orm::DbErr, room_number: i32) -> DomainError {
    if unique_violation(&err).is_some() {
        DomainError::Conflict(format!("room number {room_number} already exists"))
    } else {
        err.into()
    }
}

// ── RoomRepository impl ─────────────────────────────────────────

#[async_trait]
impl RoomRepository for SeaOrmRoomRepository {
    async fn insert(&self, r: NewRoom) -> DomainResult<Room> {
        debug!(room_number = r.room_number, "Inserting room");

        let now = Utc::now();
        let model = room::ActiveModel {
            room_number: Set(r.room_number),
            room_type: Set(r.room_type.as_str().to_string()),
            price_per_night_cents: Set(to_minor_units(r.price_per_night)?),
            capacity: Set(r.capacity),
            description: Set(r.description),
            image_url: Set(r.image_url),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| number_taken(e, r.room_number))?;
        model_to_domain(saved)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Room>> {
        room::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self, room_type: Option<RoomType>) -> DomainResult<Vec<Room>> {
        let mut query = room::Entity::find();
        if let Some(t) = room_type {
            query = query.filter(room::Column::RoomType.eq(t.as_str()));
        }
        query
            .order_by_desc(room::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn update(&self, r: Room) -> DomainResult<Room> {
        debug!(room_id = r.id, "Updating room");

        if room::Entity::find_by_id(r.id).one(&self.db).await?.is_none() {
            return Err(DomainError::not_found("Room", "id", r.id));
        }

        let model = room::ActiveModel {
            id: Set(r.id),
            room_number: Set(r.room_number),
            room_type: Set(r.room_type.as_str().to_string()),
            price_per_night_cents: Set(to_minor_units(r.price_per_night)?),
            capacity: Set(r.capacity),
            description: Set(r.description),
            image_url: Set(r.image_url),
            created_at: Set(r.created_at),
            updated_at: Set(Utc::now()),
        };
        let saved = model
            .update(&self.db)
            .await
            .map_err(|e| number_taken(e, r.room_number))?;
        model_to_domain(saved)
    }

    async fn delete_unbooked(&self, id: i32) -> DomainResult<()> {
        let _write = self.gate.enter().await;
        let txn = self.db.begin().await?;

        if room::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(DomainError::not_found("Room", "id", id));
        }

        let active = booking::Entity::find()
            .filter(booking::Column::RoomId.eq(id))
            .filter(booking::Column::BookingStatus.eq(BookingStatus::Booked.as_str()))
            .count(&txn)
            .await?;
        if active > 0 {
            return Err(DomainError::Conflict(format!(
                "room {id} still has {active} active booking(s)"
            )));
        }

        room::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(room_id = id, "Room deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{
        BookingDraft, BookingPatch, BookingRepository, ReferenceCodeGenerator,
    };
    use crate::domain::stay::StayDates;
    use crate::infrastructure::database::repositories::booking_repository::SeaOrmBookingRepository;
    use crate::infrastructure::database::repositories::test_support::memory_db;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn new_room(number: i32) -> NewRoom {
        NewRoom {
            room_number: number,
            room_type: RoomType::Suite,
            price_per_night: Decimal::new(25050, 2),
            capacity: 4,
            description: Some("Top floor".into()),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn insert_keeps_price_to_the_cent() {
        let repo = SeaOrmRoomRepository::new(memory_db().await);
        let room = repo.insert(new_room(301)).await.unwrap();
        let loaded = repo.find_by_id(room.id).await.unwrap().unwrap();
        assert_eq!(loaded.price_per_night, Decimal::new(25050, 2));
        assert_eq!(loaded.room_type, RoomType::Suite);
    }

    #[tokio::test]
    async fn duplicate_room_number_conflicts() {
        let repo = SeaOrmRoomRepository::new(memory_db().await);
        repo.insert(new_room(301)).await.unwrap();
        let err = repo.insert(new_room(301)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn find_all_filters_by_type() {
        let repo = SeaOrmRoomRepository::new(memory_db().await);
        repo.insert(new_room(1)).await.unwrap();
        let mut single = new_room(2);
        single.room_type = RoomType::Single;
        repo.insert(single).await.unwrap();

        assert_eq!(repo.find_all(None).await.unwrap().len(), 2);
        let suites = repo.find_all(Some(RoomType::Suite)).await.unwrap();
        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].room_number, 1);
    }

    #[tokio::test]
    async fn delete_is_blocked_while_booked() {
        let db = memory_db().await;
        let rooms = SeaOrmRoomRepository::new(db.clone());
        let bookings = SeaOrmBookingRepository::new(db);
        let room = rooms.insert(new_room(5)).await.unwrap();

        let booking = bookings
            .reserve(
                BookingDraft {
                    user_id: "u".into(),
                    user_email: "u@example.com".into(),
                    room_id: room.id,
                    stay: StayDates::new(
                        NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                        NaiveDate::from_ymd_opt(2025, 8, 2).unwrap(),
                    )
                    .unwrap(),
                },
                &ReferenceCodeGenerator::default(),
            )
            .await
            .unwrap();

        let err = rooms.delete_unbooked(room.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        bookings
            .apply_patch(
                booking.id,
                BookingPatch {
                    booking_status: Some(BookingStatus::Completed),
                    payment_status: None,
                },
            )
            .await
            .unwrap();
        rooms.delete_unbooked(room.id).await.unwrap();
        assert!(rooms.find_by_id(room.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn references_of_removed_bookings_are_never_reissued() {
        let db = memory_db().await;
        let rooms = SeaOrmRoomRepository::new(db.clone());
        let bookings = SeaOrmBookingRepository::new(db);
        // A single possible code: any second issue would have to reuse it.
        let refs = ReferenceCodeGenerator::new(1, 3).with_alphabet("A");
        let stay = StayDates::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 3).unwrap(),
        )
        .unwrap();
        let draft = |room_id| BookingDraft {
            user_id: "u".into(),
            user_email: "u@example.com".into(),
            room_id,
            stay,
        };

        let old_room = rooms.insert(new_room(7)).await.unwrap();
        let first = bookings.reserve(draft(old_room.id), &refs).await.unwrap();
        assert_eq!(first.reference, "A");
        bookings
            .apply_patch(
                first.id,
                BookingPatch {
                    booking_status: Some(BookingStatus::Completed),
                    payment_status: None,
                },
            )
            .await
            .unwrap();
        rooms.delete_unbooked(old_room.id).await.unwrap();
        assert!(bookings.find_by_reference("A").await.unwrap().is_none());

        let replacement = rooms.insert(new_room(8)).await.unwrap();
        let err = bookings.reserve(draft(replacement.id), &refs).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::ReferenceGenerationExhausted { attempts: 3 }
        ));
    }

    #[tokio::test]
    async fn delete_unknown_room_is_not_found() {
        let repo = SeaOrmRoomRepository::new(memory_db().await);
        let err = repo.delete_unbooked(9).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Room", .. }));
    }
}
