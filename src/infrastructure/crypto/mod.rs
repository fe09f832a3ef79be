//! Token verification and webhook signatures

pub mod jwt;
pub mod signature;

pub use jwt::{create_token, verify_token, JwtConfig, TokenClaims};
pub use signature::{sign_payload, verify_signature};
