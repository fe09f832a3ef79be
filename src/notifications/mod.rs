//! Notifications module
//!
//! Builds [`NotificationRequest`]s for booking and payment events and hands
//! them to a [`NotificationGateway`](crate::application::ports::NotificationGateway)
//! through the timeout-bounded [`Notifier`].

pub mod gateways;
pub mod notifier;
pub mod request;

pub use gateways::{LogNotificationGateway, WebhookNotificationGateway};
pub use notifier::Notifier;
pub use request::{Channel, NotificationRequest};
