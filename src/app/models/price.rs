//! Exact fixed-point fuel prices

use crate::constants::PRICE_SCALE;
use crate::{Error, Result};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Fuel price in thousandths of a euro
///
/// Stored as an integer so equality and formatting are exact; `1.609` is
/// held as `1609`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    /// Build a price from a count of thousandths
    pub const fn from_thousandths(thousandths: i64) -> Self {
        Self(thousandths)
    }

    /// Price as a count of thousandths
    pub const fn thousandths(self) -> i64 {
        self.0
    }

    /// Parse decimal text such as `1.609`
    ///
    /// Accepts non-negative decimals with at most three fractional digits.
    /// Signs, exponents and thousands separators are rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_price(text, "empty price"));
        }
        if trimmed.starts_with('-') {
            return Err(Error::invalid_price(text, "negative price"));
        }

        let (integer, fraction) = match trimmed.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (trimmed, None),
        };
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(integer) || !fraction.is_none_or(all_digits) {
            return Err(Error::invalid_price(text, "not a decimal number"));
        }

        let mut value = Decimal::from_str(trimmed)
            .map_err(|e| Error::invalid_price(text, e.to_string()))?;
        if value.scale() > PRICE_SCALE {
            return Err(Error::invalid_price(
                text,
                format!("more than {} fractional digits", PRICE_SCALE),
            ));
        }

        value.rescale(PRICE_SCALE);
        let thousandths = i64::try_from(value.mantissa())
            .map_err(|_| Error::invalid_price(text, "value out of range"))?;
        Ok(Self(thousandths))
    }

    /// Price as a decimal with exactly three fractional digits
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, PRICE_SCALE)
    }
}

impl FromStr for Price {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_decimal(), f)
    }
}
