//! SeaORM implementation of BookingRepository
//!
//! Every write that can change which nights a room has taken runs in one
//! transaction together with the matching `room_nights` rows.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, warn};

use super::room_repository::model_to_domain as room_model_to_domain;
use super::{unique_violation, WriteGate};
use crate::domain::booking::{
    Booking, BookingDraft, BookingPatch, BookingRepository, BookingStatus, PaymentStatus,
    ReferenceCodeGenerator,
};
use crate::domain::money::{from_minor_units, to_minor_units};
use crate::domain::stay::StayDates;
use crate::infrastructure::database::entities::{booking, issued_reference, room, room_night};
use crate::shared::errors::{DomainError, DomainResult};

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        let gate = WriteGate::for_backend(db.get_database_backend());
        Self::with_gate(db, gate)
    }

    pub(crate) fn with_gate(db: DatabaseConnection, gate: WriteGate) -> Self {
        Self { db, gate }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(super) fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    Ok(Booking {
        id: m.id,
        reference: m.reference,
        user_id: m.user_id,
        user_email: m.user_email,
        room_id: m.room_id,
        check_in: m.check_in,
        check_out: m.check_out,
        booking_status: BookingStatus::from_str(&m.booking_status)?,
        payment_status: PaymentStatus::from_str(&m.payment_status)?,
        total_price: from_minor_units(m.total_price_cents),
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn unavailable(room_id: i32, stay: &StayDates) -> DomainError {
    DomainError::RoomUnavailable {
        room_id,
        check_in: stay.check_in(),
        check_out: stay.check_out(),
    }
}

// ── Night claims ────────────────────────────────────────────────

/// Number of BOOKED bookings on `room_id` overlapping `stay`, other than
/// `exclude`.
async fn count_overlapping<C: ConnectionTrait>(
    conn: &C,
    room_id: i32,
    stay: &StayDates,
    exclude: Option<i32>,
) -> DomainResult<u64> {
    let mut query = booking::Entity::find()
        .filter(booking::Column::RoomId.eq(room_id))
        .filter(booking::Column::BookingStatus.eq(BookingStatus::Booked.as_str()))
        .filter(booking::Column::CheckIn.lt(stay.check_out()))
        .filter(booking::Column::CheckOut.gt(stay.check_in()));
    if let Some(id) = exclude {
        query = query.filter(booking::Column::Id.ne(id));
    }
    Ok(query.count(conn).await?)
}

/// Insert one `room_nights` row per night. The unique (room_id, night) index
/// turns a concurrent overlapping claim into `RoomUnavailable`.
async fn claim_nights(
    txn: &DatabaseTransaction,
    booking_id: i32,
    room_id: i32,
    stay: &StayDates,
) -> DomainResult<()> {
    let rows: Vec<room_night::ActiveModel> = stay
        .nights_iter()
        .map(|night| room_night::ActiveModel {
            room_id: Set(room_id),
            night: Set(night),
            booking_id: Set(booking_id),
            ..Default::default()
        })
        .collect();

    match room_night::Entity::insert_many(rows).exec(txn).await {
        Ok(_) => Ok(()),
        Err(e) if unique_violation(&e).is_some() => Err(unavailable(room_id, stay)),
        Err(e) => Err(e.into()),
    }
}

async fn release_nights(txn: &DatabaseTransaction, booking_id: i32) -> DomainResult<()> {
    room_night::Entity::delete_many()
        .filter(room_night::Column::BookingId.eq(booking_id))
        .exec(txn)
        .await?;
    Ok(())
}

/// Claim a fresh reference in `issued_references` and insert the booking
/// row under it. Each candidate is checked inside the transaction and
/// claimed within a savepoint, so a code taken by a concurrent writer only
/// costs one attempt. Codes stay claimed after their booking is deleted.
async fn insert_with_reference(
    txn: &DatabaseTransaction,
    draft: &BookingDraft,
    total_price_cents: i64,
    references: &ReferenceCodeGenerator,
) -> DomainResult<booking::Model> {
    let now = Utc::now();

    for attempt in 1..=references.max_attempts() {
        let reference = references.candidate();

        let taken = issued_reference::Entity::find_by_id(reference.clone())
            .one(txn)
            .await?
            .is_some();
        if taken {
            debug!(attempt, "Reference candidate already issued");
            continue;
        }

        let claim = issued_reference::ActiveModel {
            reference: Set(reference.clone()),
            issued_at: Set(now),
        };
        let savepoint = txn.begin().await?;
        match issued_reference::Entity::insert(claim).exec(&savepoint).await {
            Ok(_) => savepoint.commit().await?,
            Err(e) if unique_violation(&e).is_some() => {
                warn!(attempt, "Reference collided on insert, regenerating");
                savepoint.rollback().await?;
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        let model = booking::ActiveModel {
            reference: Set(reference),
            user_id: Set(draft.user_id.clone()),
            user_email: Set(draft.user_email.clone()),
            room_id: Set(draft.room_id),
            check_in: Set(draft.stay.check_in()),
            check_out: Set(draft.stay.check_out()),
            booking_status: Set(BookingStatus::Booked.as_str().to_string()),
            payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
            total_price_cents: Set(total_price_cents),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        return Ok(model.insert(txn).await?);
    }

    Err(references.exhausted())
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn reserve(
        &self,
        draft: BookingDraft,
        references: &ReferenceCodeGenerator,
    ) -> DomainResult<Booking> {
        let stay = draft.stay;
        let _write = self.gate.enter().await;
        let txn = self.db.begin().await?;

        let room = room::Entity::find_by_id(draft.room_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", "id", draft.room_id))?;

        if count_overlapping(&txn, room.id, &stay, None).await? > 0 {
            return Err(unavailable(room.id, &stay));
        }

        let room = room_model_to_domain(room)?;
        let total = to_minor_units(room.quote(&stay))?;
        let saved = insert_with_reference(&txn, &draft, total, references).await?;

        claim_nights(&txn, saved.id, room.id, &stay).await?;
        txn.commit().await?;

        info!(
            booking_reference = %saved.reference,
            room_id = room.id,
            check_in = %stay.check_in(),
            check_out = %stay.check_out(),
            "Booking reserved"
        );
        model_to_domain(saved)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>> {
        booking::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_reference(&self, reference: &str) -> DomainResult<Option<Booking>> {
        booking::Entity::find()
            .filter(booking::Column::Reference.eq(reference))
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self, newest_first: bool) -> DomainResult<Vec<Booking>> {
        let query = booking::Entity::find();
        let query = if newest_first {
            query.order_by_desc(booking::Column::Id)
        } else {
            query.order_by_asc(booking::Column::Id)
        };
        query
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn find_by_user(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn find_booked_overlapping(
        &self,
        room_id: Option<i32>,
        stay: &StayDates,
    ) -> DomainResult<Vec<Booking>> {
        let mut query = booking::Entity::find()
            .filter(booking::Column::BookingStatus.eq(BookingStatus::Booked.as_str()))
            .filter(booking::Column::CheckIn.lt(stay.check_out()))
            .filter(booking::Column::CheckOut.gt(stay.check_in()));
        if let Some(id) = room_id {
            query = query.filter(booking::Column::RoomId.eq(id));
        }
        query
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn apply_patch(&self, id: i32, patch: BookingPatch) -> DomainResult<Booking> {
        let _write = self.gate.enter().await;
        let txn = self.db.begin().await?;

        let existing = booking::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", id))?;
        let mut current = model_to_domain(existing)?;
        let was_booked = current.is_booked();

        patch.apply(&mut current);

        match (was_booked, current.is_booked()) {
            (true, false) => release_nights(&txn, current.id).await?,
            (false, true) => {
                let stay = current.stay()?;
                if count_overlapping(&txn, current.room_id, &stay, Some(current.id)).await? > 0 {
                    return Err(unavailable(current.room_id, &stay));
                }
                claim_nights(&txn, current.id, current.room_id, &stay).await?;
            }
            _ => {}
        }

        let model = booking::ActiveModel {
            id: Set(current.id),
            booking_status: Set(current.booking_status.as_str().to_string()),
            payment_status: Set(current.payment_status.as_str().to_string()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        let saved = model.update(&txn).await?;
        txn.commit().await?;

        debug!(
            booking_reference = %saved.reference,
            booking_status = %saved.booking_status,
            payment_status = %saved.payment_status,
            "Booking updated"
        );
        model_to_domain(saved)
    }
}
