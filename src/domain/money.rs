//! Fixed-point amounts. Prices are `Decimal` in the domain and stored as
//! integer minor units (cents) in the database.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::shared::errors::{DomainError, DomainResult};

const MINOR_UNITS: i64 = 100;

/// Convert an amount to minor units, rounding half away from zero to cents.
pub fn to_minor_units(amount: Decimal) -> DomainResult<i64> {
    (amount.round_dp(2) * Decimal::from(MINOR_UNITS))
        .to_i64()
        .ok_or_else(|| DomainError::Validation(format!("amount {amount} is out of range")))
}

pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

/// A price or charge: non-negative with at most two decimal places.
pub fn validate_amount(field: &str, amount: Decimal) -> DomainResult<()> {
    if amount.is_sign_negative() {
        return Err(DomainError::Validation(format!("{field} cannot be negative")));
    }
    if amount.round_dp(2) != amount {
        return Err(DomainError::Validation(format!(
            "{field} must have at most two decimal places"
        )));
    }
    Ok(())
}
