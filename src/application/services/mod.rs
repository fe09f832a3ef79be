//! Application services

pub mod availability;
pub mod ledger;
pub mod reconciler;
pub mod rooms;

pub use availability::AvailabilityChecker;
pub use ledger::{BookingDetail, LedgerSettings, ReservationLedger};
pub use reconciler::{PaymentReconciler, ReconcilerSettings};
pub use rooms::RoomCatalog;
