//! # Hotel booking service
//!
//! Room reservations with asynchronous payment reconciliation.
//!
//! ## Architecture
//!
//! - **domain**: rooms, bookings, payment records, stay dates, reference
//!   codes and repository traits
//! - **application**: use-case services (availability, reservation ledger,
//!   payment reconciler, room catalogue) and outbound ports
//! - **infrastructure**: SeaORM persistence, JWT verification, Stripe adapter
//! - **notifications**: best-effort guest notifications
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: error taxonomy, retry, shutdown, clock

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod notifications;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::database::repositories::SeaOrmRepositoryProvider;
pub use infrastructure::{init_database, run_migrations, DatabaseConfig};

pub use interfaces::http::create_api_router;
