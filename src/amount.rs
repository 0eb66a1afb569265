//! Positive monetary amounts with at most two decimal places.
//!
//! Amounts are kept as a whole number of cents so that sums are exact. They
//! cross the API boundary as [Decimal]s and are serialized as strings with
//! two decimal places, e.g. `"150.00"`.

use std::fmt::Display;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Serialize, Serializer};

/// The number of decimal places an amount may have.
pub const DECIMAL_PLACES: u32 = 2;

/// The maximum number of digits in an amount, including the decimal places.
pub const MAX_DIGITS: u32 = 10;

/// The reasons an amount may be rejected.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum AmountError {
    /// The amount is zero or negative.
    #[error("Ensure this value is greater than zero.")]
    NotPositive,
    /// The amount has fractions of a cent.
    #[error("Ensure that there are no more than 2 decimal places.")]
    TooManyDecimalPlaces,
    /// The amount is too large to store.
    #[error("Ensure that there are no more than 10 digits in total.")]
    TooManyDigits,
}

/// A validated, strictly positive amount of money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Validate `value` and convert it to an amount.
    ///
    /// # Errors
    ///
    /// Returns an [AmountError] if `value` is not greater than zero, has more
    /// than [DECIMAL_PLACES] decimal places or more than [MAX_DIGITS] digits.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }

        let value = value.normalize();

        if value.scale() > DECIMAL_PLACES {
            return Err(AmountError::TooManyDecimalPlaces);
        }

        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .ok_or(AmountError::TooManyDigits)?;

        if cents >= 10_i64.pow(MAX_DIGITS) {
            return Err(AmountError::TooManyDigits);
        }

        Ok(Self(cents))
    }

    /// Create an amount from a number of cents without validation.
    ///
    /// The caller should ensure that `cents` is greater than zero, e.g. by
    /// reading it from a column with a `CHECK (amount_cents > 0)` constraint.
    pub fn from_cents_unchecked(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount as a whole number of cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// The amount as a decimal with two decimal places.
    pub fn as_decimal(&self) -> Decimal {
        cents_to_decimal(self.0)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Serialize::serialize(&self.as_decimal(), serializer)
    }
}

/// Convert a (possibly zero or negative) number of cents into a decimal with two decimal places.
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, DECIMAL_PLACES)
}

/// Convert a number of cents into a float, e.g. for chart values.
pub fn cents_to_f64(cents: i64) -> f64 {
    cents_to_decimal(cents).to_f64().unwrap_or(cents as f64 / 100.0)
}

/// The smallest whole number of cents that is greater than or equal to `value`.
///
/// Returns `None` if the result does not fit in an `i64`.
pub fn cents_at_least(value: Decimal) -> Option<i64> {
    value.checked_mul(Decimal::ONE_HUNDRED)?.ceil().to_i64()
}

/// The largest whole number of cents that is less than or equal to `value`.
///
/// Returns `None` if the result does not fit in an `i64`.
pub fn cents_at_most(value: Decimal) -> Option<i64> {
    value.checked_mul(Decimal::ONE_HUNDRED)?.floor().to_i64()
}
