//! Monetary amounts as integer cents.
//!
//! Amounts are stored and computed in minor units (cents) so that applying
//! and reversing a balance delta is exact. The JSON surface reads and writes
//! decimal dollars, converted at the boundary by [as_dollars].

use crate::Error;

/// A monetary amount in cents. Signed: account balances may go negative.
pub type Cents = i64;

/// The largest magnitude accepted from the JSON surface, in dollars.
///
/// Keeps cent amounts well inside the range where `f64` represents integers
/// exactly, so converting back to dollars for display never loses cents.
pub const MAX_DOLLARS: f64 = 1e12;

/// Convert a decimal dollar amount into cents, rounding to the nearest cent.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `dollars` is not a finite number or its
/// magnitude exceeds [MAX_DOLLARS].
pub fn cents_from_dollars(dollars: f64) -> Result<Cents, Error> {
    if !dollars.is_finite() || dollars.abs() > MAX_DOLLARS {
        return Err(Error::InvalidAmount(dollars));
    }

    Ok((dollars * 100.0).round() as Cents)
}

/// Convert a dollar amount into cents, requiring a strictly positive result.
///
/// Transaction amounts are magnitudes; their sign comes from the transaction
/// kind, not the amount itself.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `dollars` is not finite, out of range,
/// or rounds to zero cents or less.
pub fn positive_cents_from_dollars(dollars: f64) -> Result<Cents, Error> {
    let cents = cents_from_dollars(dollars)?;

    if cents <= 0 {
        return Err(Error::InvalidAmount(dollars));
    }

    Ok(cents)
}

/// Convert a dollar amount into cents, rejecting negative results.
///
/// Budget limits may be zero but never negative.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `dollars` is not finite, out of range,
/// or rounds below zero cents.
pub fn non_negative_cents_from_dollars(dollars: f64) -> Result<Cents, Error> {
    let cents = cents_from_dollars(dollars)?;

    if cents < 0 {
        return Err(Error::InvalidAmount(dollars));
    }

    Ok(cents)
}

/// Convert cents back into decimal dollars for display.
pub fn dollars_from_cents(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Serde adapter for amount fields: stored as [Cents], serialized as dollars.
///
/// Use with `#[serde(with = "crate::money::as_dollars")]`.
pub mod as_dollars {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Cents, cents_from_dollars, dollars_from_cents};

    pub fn serialize<S>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dollars_from_cents(*cents).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Cents, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dollars = f64::deserialize(deserializer)?;

        cents_from_dollars(dollars).map_err(serde::de::Error::custom)
    }
}
