//! Payment provider adapters

pub mod stripe;

pub use stripe::{DisabledPaymentGateway, StripeGateway, STRIPE_API_BASE};
