use std::fmt;
use std::ops::Mul;

use super::Money;
use crate::space::DeepSize;

/// Basis points in one percent.
pub const BASIS_POINTS_PER_PERCENT: u32 = 100;
/// Basis points in 100%.
pub const BASIS_POINTS_PER_100_PERCENT: u32 = 100 * BASIS_POINTS_PER_PERCENT;

/// Tax rate with basis-point granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Percent {
    bps: u32,
}

impl Percent {
    /// Whole percent, e.g. `Percent::percent(37)`. Saturates at `u32::MAX`
    /// basis points; schedules reject anything above 100% anyway.
    pub const fn percent(amount: u32) -> Self {
        Self {
            bps: amount.saturating_mul(BASIS_POINTS_PER_PERCENT),
        }
    }

    /// Basis points, e.g. `Percent::basis_points(11_40)` for 11.40%.
    pub const fn basis_points(amount: u32) -> Self {
        Self { bps: amount }
    }

    /// Raw basis points.
    #[inline]
    pub const fn as_basis_points(self) -> u32 {
        self.bps
    }

    /// Apply the rate to `amount`, truncating toward zero.
    #[inline]
    pub fn apply(self, amount: Money) -> Money {
        let scaled = amount.as_cents() as i128 * self.bps as i128
            / BASIS_POINTS_PER_100_PERCENT as i128;
        // Rates above 100% are rejected by schedules; saturate rather than wrap.
        Money::of_cents(i64::try_from(scaled).unwrap_or(i64::MAX)).unwrap_or(Money::ZERO)
    }
}

impl Mul<Money> for Percent {
    type Output = Money;

    fn mul(self, rhs: Money) -> Money {
        self.apply(rhs)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.bps / BASIS_POINTS_PER_PERCENT;
        let fraction = self.bps % BASIS_POINTS_PER_PERCENT;
        if fraction == 0 {
            write!(f, "{whole}%")
        } else {
            write!(f, "{whole}.{fraction:02}%")
        }
    }
}

impl DeepSize for Percent {}
