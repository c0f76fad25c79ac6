use std::fmt;

use crate::brackets::ScheduleError;
use crate::money::{Money, Percent};
use crate::space::DeepSize;
use crate::TaxError;

/// One bracket of a progressive schedule: `rate` applies to income in `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaxBracket {
    /// Marginal rate inside the bracket.
    pub rate: Percent,
    /// Inclusive lower bound.
    pub from: Money,
    /// Exclusive upper bound; `None` for the unbounded highest bracket.
    pub to: Option<Money>,
}

impl TaxBracket {
    /// Create a bracket, checking `to > from` when an upper bound exists.
    pub fn new(rate: Percent, from: Money, to: Option<Money>) -> Result<Self, ScheduleError> {
        if let Some(to) = to {
            if to <= from {
                return Err(ScheduleError::InvertedBounds { from, to });
            }
        }
        Ok(Self { rate, from, to })
    }

    /// Bounded bracket `[from, to)`.
    pub fn bounded(rate: Percent, from: Money, to: Money) -> Result<Self, ScheduleError> {
        Self::new(rate, from, Some(to))
    }

    /// Unbounded bracket `[from, ∞)`.
    pub fn unbounded(rate: Percent, from: Money) -> Self {
        Self {
            rate,
            from,
            to: None,
        }
    }

    /// Width in cents, `None` when unbounded.
    pub fn width(&self) -> Option<i64> {
        self.to.map(|to| to.as_cents() - self.from.as_cents())
    }

    /// Whether `income` falls inside this bracket.
    pub fn contains(&self, income: Money) -> bool {
        income >= self.from && self.to.map_or(true, |to| income < to)
    }

    /// Tax owed on the part of `income` that falls inside this bracket.
    ///
    /// Income above the bracket is capped at `to`; income below `from` is a
    /// domain error.
    pub fn compute_bracket_tax(&self, income: Money) -> Result<Money, TaxError> {
        if income < self.from {
            return Err(TaxError::DomainError {
                income,
                from: self.from,
                to: self.to,
            });
        }

        let highest_income_in_bracket = match self.to {
            Some(to) if income > to => to,
            _ => income,
        };
        Ok(self.rate * highest_income_in_bracket.checked_sub(self.from)?)
    }
}

impl fmt::Display for TaxBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to {
            Some(to) => write!(f, "{} on [{}, {})", self.rate, self.from, to),
            None => write!(f, "{} on [{}, ∞)", self.rate, self.from),
        }
    }
}

impl DeepSize for TaxBracket {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        let err = TaxBracket::bounded(Percent::percent(10), Money::dollars(5), Money::dollars(5))
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvertedBounds { .. }));
    }

    #[test]
    fn bracket_tax_caps_at_upper_bound() {
        let bracket =
            TaxBracket::bounded(Percent::percent(12), Money::dollars(100), Money::dollars(200))
                .unwrap();

        assert_eq!(bracket.compute_bracket_tax(Money::dollars(100)).unwrap(), Money::ZERO);
        assert_eq!(
            bracket.compute_bracket_tax(Money::dollars(150)).unwrap(),
            Money::dollars(6)
        );
        assert_eq!(
            bracket.compute_bracket_tax(Money::dollars(10_000)).unwrap(),
            Money::dollars(12)
        );
    }

    #[test]
    fn income_below_bracket_is_domain_error() {
        let bracket = TaxBracket::unbounded(Percent::percent(37), Money::dollars(500));
        assert!(matches!(
            bracket.compute_bracket_tax(Money::dollars(499)),
            Err(TaxError::DomainError { .. })
        ));
    }

    #[test]
    fn contains_is_half_open() {
        let bracket =
            TaxBracket::bounded(Percent::percent(12), Money::dollars(1), Money::dollars(2)).unwrap();
        assert!(bracket.contains(Money::dollars(1)));
        assert!(bracket.contains(Money::cents(199)));
        assert!(!bracket.contains(Money::dollars(2)));
        assert_eq!(bracket.width(), Some(100));
    }
}
