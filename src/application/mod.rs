//! Application layer: use-case services and outbound ports.

pub mod ports;
pub mod services;

pub use services::{
    AvailabilityChecker, BookingDetail, LedgerSettings, PaymentReconciler, ReconcilerSettings,
    ReservationLedger, RoomCatalog,
};
