//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod payments;

pub use database::{init_database, run_migrations, DatabaseConfig};
