use std::ops::Index;

use thiserror::Error;

use crate::brackets::TaxBracket;
use crate::money::{Money, Percent, BASIS_POINTS_PER_100_PERCENT};
use crate::space::DeepSize;

/// Maximum number of brackets a schedule may contain.
///
/// Rates must strictly increase and are limited to basis-point granularity
/// below 100%, so there are at most 100 × 100 distinct rates.
pub const MAX_BRACKETS: usize = BASIS_POINTS_PER_100_PERCENT as usize;

/// Violations of the bracket-schedule invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// No brackets supplied.
    #[error("a schedule needs at least one bracket")]
    Empty,

    /// A bracket's upper bound is not above its lower bound.
    #[error("upper bound {to} must be greater than lower bound {from}")]
    InvertedBounds {
        /// Lower bound.
        from: Money,
        /// Upper bound.
        to: Money,
    },

    /// The first bracket does not start at zero.
    #[error("the first bracket must start at $0, found {from}")]
    FirstBracketNotAtZero {
        /// Lower bound of the first bracket.
        from: Money,
    },

    /// A bracket does not start where the previous one ends.
    #[error("bracket {index} starts at {found} but the previous bracket ends at {expected}")]
    Discontinuous {
        /// Index of the offending bracket.
        index: usize,
        /// Upper bound of the previous bracket.
        expected: Money,
        /// Lower bound of this bracket.
        found: Money,
    },

    /// A bracket other than the last one has no upper bound.
    #[error("only the last bracket may be unbounded (bracket {index} is unbounded)")]
    UnboundedInnerBracket {
        /// Index of the offending bracket.
        index: usize,
    },

    /// The last bracket has an upper bound.
    #[error("the last bracket must be unbounded")]
    BoundedHighestBracket,

    /// Rates are not strictly increasing.
    #[error("bracket {index} rate {rate} does not exceed the previous rate {previous}")]
    RateNotIncreasing {
        /// Index of the offending bracket.
        index: usize,
        /// Rate of the previous bracket.
        previous: Percent,
        /// Rate of this bracket.
        rate: Percent,
    },

    /// A rate exceeds 100%.
    #[error("bracket {index} rate {rate} exceeds 100%")]
    RateOutOfRange {
        /// Index of the offending bracket.
        index: usize,
        /// Offending rate.
        rate: Percent,
    },

    /// More brackets than distinct basis-point rates allow.
    #[error("{count} brackets exceeds the maximum of {max}")]
    TooManyBrackets {
        /// Number of brackets supplied.
        count: usize,
        /// Allowed maximum.
        max: usize,
    },
}

/// Validated, immutable progressive bracket schedule.
///
/// Invariants:
/// - the first bracket starts at $0
/// - every bracket ends where the next one starts
/// - only the last bracket is unbounded
/// - rates strictly increase and never exceed 100%
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BracketSchedule {
    brackets: Vec<TaxBracket>,
}

impl BracketSchedule {
    /// Validate an ordered list of brackets.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, ScheduleError> {
        let first = brackets.first().ok_or(ScheduleError::Empty)?;
        if brackets.len() > MAX_BRACKETS {
            return Err(ScheduleError::TooManyBrackets {
                count: brackets.len(),
                max: MAX_BRACKETS,
            });
        }
        if first.from != Money::ZERO {
            return Err(ScheduleError::FirstBracketNotAtZero { from: first.from });
        }

        for (index, bracket) in brackets.iter().enumerate() {
            if let Some(to) = bracket.to {
                if to <= bracket.from {
                    return Err(ScheduleError::InvertedBounds {
                        from: bracket.from,
                        to,
                    });
                }
            }
            if bracket.rate.as_basis_points() > BASIS_POINTS_PER_100_PERCENT {
                return Err(ScheduleError::RateOutOfRange {
                    index,
                    rate: bracket.rate,
                });
            }
            if index == 0 {
                continue;
            }

            let previous = &brackets[index - 1];
            let expected = previous
                .to
                .ok_or(ScheduleError::UnboundedInnerBracket { index: index - 1 })?;
            if bracket.from != expected {
                return Err(ScheduleError::Discontinuous {
                    index,
                    expected,
                    found: bracket.from,
                });
            }
            if bracket.rate <= previous.rate {
                return Err(ScheduleError::RateNotIncreasing {
                    index,
                    previous: previous.rate,
                    rate: bracket.rate,
                });
            }
        }

        if brackets.last().and_then(|b| b.to).is_some() {
            return Err(ScheduleError::BoundedHighestBracket);
        }

        Ok(Self { brackets })
    }

    /// Build a schedule from `(rate, lower bound)` pairs; each bracket ends
    /// where the next one starts and the last one is unbounded.
    pub fn from_lower_bounds(bounds: &[(Percent, Money)]) -> Result<Self, ScheduleError> {
        let mut brackets = Vec::with_capacity(bounds.len());
        for (idx, &(rate, from)) in bounds.iter().enumerate() {
            let to = bounds.get(idx + 1).map(|&(_, next_from)| next_from);
            brackets.push(TaxBracket::new(rate, from, to)?);
        }
        Self::new(brackets)
    }

    /// Brackets in ascending order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Number of brackets (always at least one).
    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// The unbounded highest bracket.
    pub fn highest(&self) -> &TaxBracket {
        &self.brackets[self.brackets.len() - 1]
    }

    /// Lower bound of the highest bracket in cents; every quantized index
    /// covers `[0, range)`.
    pub fn range(&self) -> i64 {
        self.highest().from.as_cents()
    }

    /// Widths of the bounded brackets, in cents.
    pub fn finite_widths(&self) -> impl Iterator<Item = i64> + '_ {
        self.brackets.iter().filter_map(TaxBracket::width)
    }

    /// Narrowest bounded bracket width, `None` for a single-bracket schedule.
    pub fn narrowest_width(&self) -> Option<i64> {
        self.finite_widths().min()
    }

    /// Iterate over the brackets.
    pub fn iter(&self) -> std::slice::Iter<'_, TaxBracket> {
        self.brackets.iter()
    }
}

impl Index<usize> for BracketSchedule {
    type Output = TaxBracket;

    fn index(&self, index: usize) -> &TaxBracket {
        &self.brackets[index]
    }
}

impl<'a> IntoIterator for &'a BracketSchedule {
    type Item = &'a TaxBracket;
    type IntoIter = std::slice::Iter<'a, TaxBracket>;

    fn into_iter(self) -> Self::IntoIter {
        self.brackets.iter()
    }
}

impl DeepSize for BracketSchedule {
    fn heap_size(&self) -> usize {
        self.brackets.heap_size()
    }
}
