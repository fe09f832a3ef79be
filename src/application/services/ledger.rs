//! Reservation ledger
//!
//! Owns booking creation and edits. Creation runs the check, price, reference
//! and insert steps as one transaction in the booking repository, guarded by
//! the unique night index in storage and, within this process, by a per-room
//! lock that keeps same-room requests from fighting over the database.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::booking::{Booking, BookingDraft, BookingPatch, ReferenceCodeGenerator};
use crate::domain::identity::Identity;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::room::Room;
use crate::domain::stay::StayDates;
use crate::notifications::{NotificationRequest, Notifier};
use crate::shared::clock::Clock;
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::retry::{retry_transient, RetryConfig};

/// A booking together with the room it holds. Only returned by explicit
/// lookups, never by bulk listings.
#[derive(Debug, Clone)]
pub struct BookingDetail {
    pub booking: Booking,
    pub room: Room,
}

#[derive(Debug, Clone)]
pub struct LedgerSettings {
    pub references: ReferenceCodeGenerator,
    pub retry: RetryConfig,
    /// Base URL of the payment page linked from confirmations
    pub payment_link_base: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            references: ReferenceCodeGenerator::default(),
            retry: RetryConfig::default(),
            payment_link_base: "http://localhost:3000/payment".to_string(),
        }
    }
}

pub struct ReservationLedger {
    repos: Arc<dyn RepositoryProvider>,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
    settings: LedgerSettings,
    room_locks: DashMap<i32, Arc<Mutex<()>>>,
}

impl ReservationLedger {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        clock: Arc<dyn Clock>,
        notifier: Notifier,
        settings: LedgerSettings,
    ) -> Self {
        Self {
            repos,
            clock,
            notifier,
            settings,
            room_locks: DashMap::new(),
        }
    }

    fn room_lock(&self, room_id: i32) -> Arc<Mutex<()>> {
        self.room_locks.entry(room_id).or_default().clone()
    }

    async fn load_room(&self, room_id: i32) -> DomainResult<Room> {
        self.repos
            .rooms()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", "id", room_id))
    }

    /// Book `room_id` for `identity` over `[check_in, check_out)`.
    pub async fn create_booking(
        &self,
        identity: &Identity,
        room_id: i32,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> DomainResult<BookingDetail> {
        let stay = StayDates::upcoming(check_in, check_out, self.clock.today())?;
        let room = self.load_room(room_id).await?;

        let draft = BookingDraft {
            user_id: identity.user_id.clone(),
            user_email: identity.email.clone(),
            room_id,
            stay,
        };

        let lock = self.room_lock(room_id);
        let reserved = {
            let _guard = lock.lock().await;
            retry_transient(&self.settings.retry, "reserve_booking", || {
                self.repos
                    .bookings()
                    .reserve(draft.clone(), &self.settings.references)
            })
            .await
        };

        let booking = match reserved {
            Ok(booking) => booking,
            Err(e) => {
                if matches!(e, DomainError::RoomUnavailable { .. }) {
                    metrics::counter!("booking_conflicts_total").increment(1);
                }
                warn!(room_id, user_id = %identity.user_id, error = %e, "Booking rejected");
                return Err(e);
            }
        };

        metrics::counter!("bookings_created_total").increment(1);
        info!(
            booking_reference = %booking.reference,
            room_id,
            user_id = %identity.user_id,
            total_price = %booking.total_price,
            "Booking created"
        );

        self.notifier
            .notify(NotificationRequest::booking_confirmation(
                &booking,
                &self.settings.payment_link_base,
            ))
            .await;

        Ok(BookingDetail { booking, room })
    }

    /// Full booking with its room. Bookings the caller may not see are
    /// reported as missing.
    pub async fn get_by_reference(
        &self,
        identity: &Identity,
        reference: &str,
    ) -> DomainResult<BookingDetail> {
        let booking = self
            .repos
            .bookings()
            .find_by_reference(reference)
            .await?
            .filter(|b| identity.can_access(&b.user_id))
            .ok_or_else(|| DomainError::not_found("Booking", "reference", reference))?;
        let room = self.load_room(booking.room_id).await?;
        Ok(BookingDetail { booking, room })
    }

    /// Every booking (admin only)
    pub async fn list_all(
        &self,
        identity: &Identity,
        newest_first: bool,
    ) -> DomainResult<Vec<Booking>> {
        identity.require_admin()?;
        self.repos.bookings().find_all(newest_first).await
    }

    /// The caller's own bookings, newest first
    pub async fn list_for_user(&self, identity: &Identity) -> DomainResult<Vec<Booking>> {
        self.repos.bookings().find_by_user(&identity.user_id).await
    }

    /// Admin edit: only fields present in `patch` change.
    pub async fn update_booking(
        &self,
        identity: &Identity,
        id: i32,
        patch: BookingPatch,
    ) -> DomainResult<BookingDetail> {
        identity.require_admin()?;

        let current = self
            .repos
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", id))?;

        if patch.is_empty() {
            let room = self.load_room(current.room_id).await?;
            return Ok(BookingDetail {
                booking: current,
                room,
            });
        }

        let lock = self.room_lock(current.room_id);
        let booking = {
            let _guard = lock.lock().await;
            retry_transient(&self.settings.retry, "update_booking", || {
                self.repos.bookings().apply_patch(id, patch)
            })
            .await?
        };

        info!(
            booking_reference = %booking.reference,
            booking_status = %booking.booking_status,
            payment_status = %booking.payment_status,
            "Booking updated by admin"
        );

        let room = self.load_room(booking.room_id).await?;
        Ok(BookingDetail { booking, room })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::*;
    use crate::domain::booking::{BookingStatus, PaymentStatus};
    use crate::infrastructure::database::repositories::test_support::FileDb;
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::notifications::request::SUBJECT_BOOKING_CONFIRMATION;
    use crate::notifications::testing::{FailingGateway, RecordingGateway};
    use crate::shared::errors::DateRule;
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::str::FromStr;
    use std::time::Duration;

    struct Fixture {
        ledger: Arc<ReservationLedger>,
        notifications: Arc<RecordingGateway>,
        room: Room,
    }

    async fn fixture() -> Fixture {
        let repos = repos().await;
        let room = add_room(repos.as_ref(), 101, "100.00").await;
        let notifications = Arc::new(RecordingGateway::default());
        let ledger = ReservationLedger::new(
            repos,
            clock(),
            Notifier::new(notifications.clone(), Duration::from_secs(1)),
            LedgerSettings::default(),
        );
        Fixture {
            ledger: Arc::new(ledger),
            notifications,
            room,
        }
    }

    #[tokio::test]
    async fn create_prices_the_stay_and_confirms() {
        let f = fixture().await;
        let guest = customer("guest-1");

        let detail = f
            .ledger
            .create_booking(&guest, f.room.id, day(3), day(6))
            .await
            .unwrap();

        assert_eq!(detail.booking.total_price, Decimal::from_str("300.00").unwrap());
        assert_eq!(detail.booking.booking_status, BookingStatus::Booked);
        assert_eq!(detail.booking.payment_status, PaymentStatus::Pending);
        assert_eq!(detail.booking.user_id, "guest-1");
        assert_eq!(detail.room.id, f.room.id);

        let sent = f.notifications.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, SUBJECT_BOOKING_CONFIRMATION);
        assert_eq!(sent[0].correlation_id, detail.booking.reference);
    }

    #[tokio::test]
    async fn date_rules_are_reported_by_name() {
        let f = fixture().await;
        let guest = customer("g");

        let past = f.ledger.create_booking(&guest, f.room.id, day(0), day(2)).await;
        assert!(matches!(
            past.unwrap_err(),
            DomainError::InvalidDateRange(DateRule::CheckInInPast)
        ));

        let same = f.ledger.create_booking(&guest, f.room.id, day(4), day(4)).await;
        assert!(matches!(
            same.unwrap_err(),
            DomainError::InvalidDateRange(DateRule::CheckOutEqualsCheckIn)
        ));

        let reversed = f.ledger.create_booking(&guest, f.room.id, day(5), day(4)).await;
        assert!(matches!(
            reversed.unwrap_err(),
            DomainError::InvalidDateRange(DateRule::CheckOutBeforeCheckIn)
        ));
        assert!(f.notifications.sent().is_empty());
    }

    #[tokio::test]
    async fn unknown_room_is_not_found() {
        let f = fixture().await;
        let err = f
            .ledger
            .create_booking(&customer("g"), 999, day(2), day(3))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Room", .. }));
    }

    #[tokio::test]
    async fn concurrent_overlapping_requests_book_exactly_once() {
        let f = fixture().await;

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let ledger = f.ledger.clone();
                let room_id = f.room.id;
                tokio::spawn(async move {
                    ledger
                        .create_booking(&customer(&format!("g{i}")), room_id, day(10), day(13))
                        .await
                })
            })
            .collect();

        let mut booked = 0;
        let mut unavailable = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => booked += 1,
                Err(DomainError::RoomUnavailable { .. }) => unavailable += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(booked, 1);
        assert_eq!(unavailable, 7);
    }

    #[tokio::test]
    async fn concurrent_disjoint_requests_all_succeed() {
        let f = fixture().await;

        let tasks: Vec<_> = (0..5)
            .map(|i| {
                let ledger = f.ledger.clone();
                let room_id = f.room.id;
                tokio::spawn(async move {
                    let start = 10 + i * 2;
                    ledger
                        .create_booking(&customer("g"), room_id, day(start), day(start + 2))
                        .await
                })
            })
            .collect();

        let mut references = HashSet::new();
        for task in tasks {
            let detail = task.await.unwrap().unwrap();
            references.insert(detail.booking.reference);
        }
        assert_eq!(references.len(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_bookings_on_separate_rooms_succeed_on_a_file_database() {
        let file = FileDb::open().await;
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(file.db.clone()));
        let mut room_ids = Vec::new();
        for number in 0..24 {
            room_ids.push(add_room(repos.as_ref(), 200 + number, "80.00").await.id);
        }
        let ledger = Arc::new(ReservationLedger::new(
            repos,
            clock(),
            Notifier::new(Arc::new(RecordingGateway::default()), Duration::from_secs(1)),
            LedgerSettings {
                // Every request must get through on its first attempt.
                retry: RetryConfig::with_attempts(1),
                ..LedgerSettings::default()
            },
        ));

        let tasks: Vec<_> = room_ids
            .into_iter()
            .map(|room_id| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .create_booking(&customer("g"), room_id, day(20), day(23))
                        .await
                })
            })
            .collect();

        for task in tasks {
            let detail = task.await.unwrap().unwrap();
            assert_eq!(detail.booking.booking_status, BookingStatus::Booked);
        }
    }

    #[tokio::test]
    async fn references_are_pairwise_distinct() {
        let repos = repos().await;
        let notifier = Notifier::new(Arc::new(RecordingGateway::default()), Duration::from_secs(1));
        let ledger = ReservationLedger::new(repos.clone(), clock(), notifier, LedgerSettings::default());

        let mut references = HashSet::new();
        for n in 0..20 {
            let room = add_room(repos.as_ref(), 200 + n, "50.00").await;
            let detail = ledger
                .create_booking(&customer("g"), room.id, day(2), day(3))
                .await
                .unwrap();
            references.insert(detail.booking.reference);
        }
        assert_eq!(references.len(), 20);
    }

    #[tokio::test]
    async fn failed_notification_keeps_the_booking() {
        let repos = repos().await;
        let room = add_room(repos.as_ref(), 1, "80.00").await;
        let notifier = Notifier::new(Arc::new(FailingGateway::default()), Duration::from_secs(1));
        let ledger = ReservationLedger::new(repos, clock(), notifier, LedgerSettings::default());

        let detail = ledger
            .create_booking(&customer("g"), room.id, day(2), day(4))
            .await
            .unwrap();
        let found = ledger
            .get_by_reference(&customer("g"), &detail.booking.reference)
            .await
            .unwrap();
        assert_eq!(found.booking.id, detail.booking.id);
    }

    #[tokio::test]
    async fn lookup_is_limited_to_owner_and_admin() {
        let f = fixture().await;
        let detail = f
            .ledger
            .create_booking(&customer("owner"), f.room.id, day(2), day(3))
            .await
            .unwrap();
        let reference = detail.booking.reference;

        assert!(f.ledger.get_by_reference(&customer("owner"), &reference).await.is_ok());
        assert!(f.ledger.get_by_reference(&admin(), &reference).await.is_ok());
        assert!(matches!(
            f.ledger
                .get_by_reference(&customer("stranger"), &reference)
                .await
                .unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            f.ledger.get_by_reference(&admin(), "MISSING").await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn listings_respect_roles() {
        let f = fixture().await;
        f.ledger
            .create_booking(&customer("a"), f.room.id, day(2), day(3))
            .await
            .unwrap();
        f.ledger
            .create_booking(&customer("b"), f.room.id, day(3), day(4))
            .await
            .unwrap();

        assert!(matches!(
            f.ledger.list_all(&customer("a"), true).await.unwrap_err(),
            DomainError::Forbidden(_)
        ));
        let all = f.ledger.list_all(&admin(), true).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].id > all[1].id);

        let mine = f.ledger.list_for_user(&customer("a")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, "a");
    }

    #[tokio::test]
    async fn update_with_only_booking_status_keeps_payment_status() {
        let f = fixture().await;
        let detail = f
            .ledger
            .create_booking(&customer("g"), f.room.id, day(2), day(5))
            .await
            .unwrap();

        let updated = f
            .ledger
            .update_booking(
                &admin(),
                detail.booking.id,
                BookingPatch {
                    booking_status: Some(BookingStatus::Cancelled),
                    payment_status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.booking.booking_status, BookingStatus::Cancelled);
        assert_eq!(updated.booking.payment_status, PaymentStatus::Pending);
        assert_eq!(updated.booking.reference, detail.booking.reference);

        // The cancelled nights are free again.
        f.ledger
            .create_booking(&customer("h"), f.room.id, day(3), day(4))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_update_leaves_the_booking_untouched() {
        let f = fixture().await;
        let created = f
            .ledger
            .create_booking(&customer("g"), f.room.id, day(7), day(9))
            .await
            .unwrap()
            .booking;

        let detail = f
            .ledger
            .update_booking(&admin(), created.id, BookingPatch::default())
            .await
            .unwrap();
        assert_eq!(detail.booking, created);
        assert_eq!(detail.room.id, f.room.id);
    }

    #[tokio::test]
    async fn update_requires_admin_and_existing_booking() {
        let f = fixture().await;
        assert!(matches!(
            f.ledger
                .update_booking(&customer("g"), 1, BookingPatch::default())
                .await
                .unwrap_err(),
            DomainError::Forbidden(_)
        ));
        assert!(matches!(
            f.ledger
                .update_booking(&admin(), 404, BookingPatch::default())
                .await
                .unwrap_err(),
            DomainError::NotFound { entity: "Booking", .. }
        ));
    }
}
