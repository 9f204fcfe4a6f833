//! Money type with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` and enforces the ledger's
//! minor-unit precision (two fractional digits) whenever an amount enters
//! the system from outside.

use std::iter::Sum;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fractional digits a ledger amount may carry.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Errors raised while turning untrusted input into [`Money`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The input is not a finite decimal number.
    #[error("'{0}' is not a valid amount")]
    NotANumber(String),

    /// The input has more fractional digits than the minor unit allows.
    #[error("amount {amount} has more than {max} fractional digits")]
    TooPrecise {
        /// The offending amount, as written.
        amount: String,
        /// The maximum allowed scale.
        max: u32,
    },

    /// The input is a finite number whose magnitude `Decimal` cannot hold.
    #[error("amount '{input}' is outside the representable range")]
    OutOfRange {
        /// The offending input.
        input: String,
        /// Nearest representable value: `Decimal::MAX` or `Decimal::MIN`
        /// for huge magnitudes, zero for vanishingly small ones.
        saturated: Decimal,
    },
}

/// Decimal exponent from which a literal no longer fits in a `Decimal`.
const MAX_DECIMAL_EXPONENT: i64 = 28;

/// A single-currency monetary amount.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wraps a decimal read from trusted storage.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates an amount from whole currency units.
    #[must_use]
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Validates an untrusted decimal against the minor-unit precision.
    ///
    /// Trailing zeros are ignored, so `500.000` is accepted as `500`.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooPrecise` if more than two significant
    /// fractional digits are present.
    pub fn from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        let normalized = amount.normalize();
        if normalized.scale() > MINOR_UNIT_SCALE {
            return Err(MoneyError::TooPrecise {
                amount: amount.to_string(),
                max: MINOR_UNIT_SCALE,
            });
        }
        Ok(Self(normalized))
    }

    /// Parses a textual amount (`"1000"`, `"12.50"`, `"1e3"`).
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Money::parse_decimal`], and
    /// `MoneyError::TooPrecise` for sub-minor-unit amounts.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        Self::from_decimal(Self::parse_decimal(input)?)
    }

    /// Parses a textual amount without applying the minor-unit precision.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::NotANumber` for anything that is not a finite
    /// decimal literal. A literal too large or too small for `Decimal` is
    /// `MoneyError::OutOfRange`, and one with more significant digits than
    /// `Decimal` can carry is `MoneyError::TooPrecise`.
    pub fn parse_decimal(input: &str) -> Result<Decimal, MoneyError> {
        let trimmed = input.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| unrepresentable(input, trimmed))
    }

    /// Returns the inner decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Subtracts `other`, returning `None` on overflow.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

/// Classifies a literal `Decimal` refused to parse.
fn unrepresentable(input: &str, trimmed: &str) -> MoneyError {
    let Some((negative, magnitude)) = literal_magnitude(trimmed) else {
        return MoneyError::NotANumber(input.to_string());
    };
    let saturated = match magnitude {
        Some(exp) if exp >= MAX_DECIMAL_EXPONENT && negative => Decimal::MIN,
        Some(exp) if exp >= MAX_DECIMAL_EXPONENT => Decimal::MAX,
        Some(exp) if exp >= 0 => {
            return MoneyError::TooPrecise {
                amount: trimmed.to_string(),
                max: MINOR_UNIT_SCALE,
            };
        }
        _ => Decimal::ZERO,
    };
    MoneyError::OutOfRange {
        input: input.to_string(),
        saturated,
    }
}

/// Sign and decimal exponent of the leading significant digit of a numeric
/// literal (`[+-]digits[.digits][e[+-]digits]`), or `None` if the text is
/// not one. Zero has no leading digit.
fn literal_magnitude(text: &str) -> Option<(bool, Option<i64>)> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !all_digits(int_part)
        || !all_digits(frac_part)
    {
        return None;
    }
    let exponent = match exponent {
        None => 0,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            if digits.is_empty() || !all_digits(digits) {
                return None;
            }
            exp.parse::<i64>()
                .unwrap_or(if exp.starts_with('-') { i64::MIN } else { i64::MAX })
        }
    };
    let leading = if let Some(at) = int_part.bytes().position(|b| b != b'0') {
        i64::try_from(int_part.len() - at - 1).ok()?
    } else if let Some(at) = frac_part.bytes().position(|b| b != b'0') {
        -i64::try_from(at + 1).ok()?
    } else {
        return Some((negative, None));
    };
    Some((negative, Some(leading.saturating_add(exponent))))
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|m| m.0).sum())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.round_dp(MINOR_UNIT_SCALE))
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
