use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use thiserror::Error;

use crate::space::DeepSize;

/// Number of cents in one dollar.
pub const CENTS_PER_DOLLAR: i64 = 100;

/// Error type returned by money construction and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Attempted to create (or compute) a negative amount.
    #[error("negative cents are not allowed: {cents}")]
    Negative {
        /// Offending value in cents.
        cents: i64,
    },

    /// Division by zero.
    #[error("cannot divide money by zero")]
    DivisionByZero,

    /// Result does not fit in 64 bits of cents.
    #[error("money arithmetic overflowed")]
    Overflow,

    /// Text could not be parsed as an amount.
    #[error("invalid money literal '{0}'")]
    Parse(String),
}

/// Non-negative amount of money stored as a count of cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money { cents: 0 };

    /// Create an amount from a count of cents.
    pub fn of_cents(cents: i64) -> Result<Self, MoneyError> {
        if cents < 0 {
            return Err(MoneyError::Negative { cents });
        }
        Ok(Self { cents })
    }

    /// Create an amount from whole dollars.
    pub fn of_dollars(dollars: i64) -> Result<Self, MoneyError> {
        let cents = dollars
            .checked_mul(CENTS_PER_DOLLAR)
            .ok_or(MoneyError::Overflow)?;
        Self::of_cents(cents)
    }

    /// Create an amount from dollars plus a cents part in `0..=99`.
    pub fn of(dollars: i64, cents: i64) -> Result<Self, MoneyError> {
        if !(0..CENTS_PER_DOLLAR).contains(&cents) {
            return Err(MoneyError::Parse(format!(
                "cents must be between 0 and 99 inclusive, got {cents}"
            )));
        }
        let whole = Self::of_dollars(dollars)?;
        whole.checked_add(Money { cents })
    }

    /// Infallible constructor for literal cent amounts.
    pub const fn cents(cents: u32) -> Self {
        Self {
            cents: cents as i64,
        }
    }

    /// Infallible constructor for literal dollar amounts.
    pub const fn dollars(dollars: u32) -> Self {
        Self {
            cents: dollars as i64 * CENTS_PER_DOLLAR,
        }
    }

    /// Raw count of cents.
    #[inline]
    pub const fn as_cents(self) -> i64 {
        self.cents
    }

    /// Addition that reports overflow instead of wrapping.
    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        self.cents
            .checked_add(other.cents)
            .map(|cents| Money { cents })
            .ok_or(MoneyError::Overflow)
    }

    /// Subtraction; fails when the result would be negative.
    pub fn checked_sub(self, other: Money) -> Result<Money, MoneyError> {
        Self::of_cents(self.cents - other.cents)
    }

    /// Scale by an integer factor.
    pub fn times(self, factor: i64) -> Result<Money, MoneyError> {
        let cents = self
            .cents
            .checked_mul(factor)
            .ok_or(MoneyError::Overflow)?;
        Self::of_cents(cents)
    }

    /// Truncating integer division.
    pub fn div(self, divisor: i64) -> Result<Money, MoneyError> {
        if divisor == 0 {
            return Err(MoneyError::DivisionByZero);
        }
        Self::of_cents(self.cents / divisor)
    }
}

/// Saturates at the largest representable amount; use
/// [`Money::checked_add`] to detect overflow.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = self.cents / CENTS_PER_DOLLAR;
        let remainder = self.cents % CENTS_PER_DOLLAR;
        if remainder == 0 {
            write!(f, "${dollars}")
        } else {
            write!(f, "${dollars}.{remainder:02}")
        }
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Accepts `1234`, `1234.5`, `1234.56`, `$1,234.56` and `1_234`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MoneyError::Parse(s.to_string());

        let trimmed = s.trim();
        let body = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let cleaned: String = body.chars().filter(|c| *c != ',' && *c != '_').collect();
        if cleaned.starts_with('-') {
            return Err(invalid());
        }

        let (whole, fraction) = match cleaned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (cleaned.as_str(), ""),
        };
        if whole.is_empty() || fraction.len() > 2 {
            return Err(invalid());
        }

        let dollars: i64 = whole.parse().map_err(|_| invalid())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        Money::of(dollars, cents)
    }
}

impl DeepSize for Money {}
