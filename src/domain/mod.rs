//! Domain layer: entities, value types and repository interfaces.

pub mod booking;
pub mod identity;
pub mod money;
pub mod payment;
pub mod repositories;
pub mod room;
pub mod stay;

pub use booking::{Booking, BookingDraft, BookingPatch, BookingStatus, PaymentStatus};
pub use identity::{Identity, Role};
pub use payment::{OutcomeReport, PaymentOutcome, PaymentRecord, RecordedOutcome};
pub use repositories::RepositoryProvider;
pub use room::{NewRoom, Room, RoomPatch, RoomType};
pub use stay::StayDates;

pub use crate::shared::errors::{DomainError, DomainResult};
