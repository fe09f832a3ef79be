//! Repository provider for the domain layer

use super::booking::BookingRepository;
use super::payment::PaymentRepository;
use super::room::RoomRepository;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let room = repos.rooms().find_by_id(1).await?;
///     let booking = repos.bookings().find_by_reference("ABCDEFGH23").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn rooms(&self) -> &dyn RoomRepository;
    fn bookings(&self) -> &dyn BookingRepository;
    fn payments(&self) -> &dyn PaymentRepository;
}
