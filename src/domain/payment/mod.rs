//! Payment aggregate
//!
//! Append-only audit records of gateway outcomes.

pub mod model;
pub mod repository;

pub use model::{OutcomeReport, PaymentOutcome, PaymentRecord, RecordedOutcome, GATEWAY_STRIPE};
pub use repository::PaymentRepository;
