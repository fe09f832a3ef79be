//! Payment intent and provider webhook endpoints

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
