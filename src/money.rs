//! Money helpers.
//!
//! Amounts are stored as integer cents and surfaced as two-place decimals.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Converts stored cents into a two-place decimal amount.
#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Converts a decimal amount into cents.
///
/// Rejects amounts with more than two decimal places or that do not fit in an `i64`.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    if amount.normalize().scale() > 2 {
        return Err(Error::validation(format!(
            "Amount {amount} has more than two decimal places"
        )));
    }

    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.trunc().to_i64())
        .ok_or_else(|| Error::validation(format!("Amount {amount} is out of range")))
}

/// Multiplies a unit price in cents by a ticket quantity.
pub fn total_cents(price_cents: i64, quantity: i32) -> Result<i64> {
    price_cents
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| Error::validation("Purchase total is out of range"))
}
