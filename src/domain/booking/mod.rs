//! Booking aggregate
//!
//! Contains the Booking entity, status enums, patch type, reference code
//! generator, and repository interface.

pub mod model;
pub mod reference;
pub mod repository;

pub use model::{Booking, BookingDraft, BookingPatch, BookingStatus, PaymentStatus};
pub use reference::ReferenceCodeGenerator;
pub use repository::BookingRepository;
