//! Monetary amounts and currencies.
//!
//! Amounts are kept as `Decimal` with exactly two fractional digits. The payment
//! gateway signs the textual amount, so `Display` always renders `0.00` form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use super::ValidationError;

/// Non-negative amount of money, scaled to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero amount.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates an amount, rounding to two decimal places.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::invalid_format("amount", "must not be negative"));
        }
        let mut scaled = value.round_dp(2);
        scaled.rescale(2);
        Ok(Self(scaled))
    }

    /// Returns the decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// True for a zero amount.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled = self.0;
        scaled.rescale(2);
        write!(f, "{}", scaled)
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| ValidationError::invalid_format("amount", e.to_string()))?;
        Amount::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Decimal {
        amount.0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

/// Currency of a payment or revenue record.
///
/// The gateway only settles roubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    #[serde(rename = "RUB", alias = "rub")]
    Rub,
}

impl Currency {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
        }
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RUB" => Ok(Currency::Rub),
            other => Err(ValidationError::invalid_format(
                "currency",
                format!("unsupported currency {}", other),
            )),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
