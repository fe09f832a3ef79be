//! Application ports (hexagonal architecture boundaries)

pub mod outbound;

pub use outbound::{
    GatewayError, NotificationGateway, PaymentGateway, PaymentIntent, PaymentIntentRequest,
};
