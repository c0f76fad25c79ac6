//! # Constant-time progressive income tax
//!
//! Computes the tax owed on an income under a progressive bracket schedule,
//! trading lookup-table memory for query speed:
//!
//! 1. **Accumulated chain**: every bracket records the tax owed on all income
//!    below its start, so a known bracket gives the total in one multiply-add
//! 2. **Quantized tables**: round the income down to a slot and read the
//!    bracket back; slots as wide as the GCD of bracket widths are exact
//! 3. **Narrowest-bracket chunks**: wider slots hold at most one boundary,
//!    repaired by a single forward step
//! 4. **Regions**: each uniform region picks its own chunk size, so one narrow
//!    bracket only inflates the region it lives in
//!
//! Region size is `5 × ⌊√(range × narrowest / √N)⌋` cents.
//!
//! ## Usage Example
//!
//! ```
//! use taxindex::{CalculatorKind, SampleDataset, TaxCalculator, TaxIndex, Money};
//!
//! let schedule = SampleDataset::Texas.schedule()?;
//! let index = TaxIndex::build(CalculatorKind::Region, &schedule)?;
//! assert_eq!(index.compute_tax(Money::dollars(10_275))?, Money::cents(102_750));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod brackets; // Schedules, accumulated chain, generators
pub mod calculators; // Linear, log-N and quantized indexes
pub mod money; // Fixed-point amounts and rates
pub mod space; // Deep-size accounting and memory simulation
pub mod validate; // Cross-checks against the linear reference

pub use brackets::{BracketSchedule, SampleDataset, ScheduleError, TaxBracket, MAX_BRACKETS};
pub use calculators::{CalculatorKind, RegionConfig, TaxCalculator, TaxIndex};
pub use money::{Money, MoneyError, Percent};
pub use space::DeepSize;
pub use validate::{ValidationError, Validator, ValidatorConfig};

use thiserror::Error;

/// Errors raised while building or querying a tax calculator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxError {
    /// An amount was negative or overflowed.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    /// The brackets do not form a valid progressive schedule.
    #[error("invalid bracket schedule: {0}")]
    InvalidBracketSchedule(#[from] ScheduleError),

    /// The income is not covered by the bracket it was resolved to.
    #[error("income {income} lies outside bracket [{from}, {})", upper_bound_label(.to))]
    DomainError {
        /// Queried income.
        income: Money,
        /// Lower bound of the resolved bracket.
        from: Money,
        /// Upper bound of the resolved bracket.
        to: Option<Money>,
    },

    /// A chunk or region size degenerated to an unusable value.
    #[error("unsupported quantization: {0}")]
    UnsupportedQuantization(String),
}

fn upper_bound_label(to: &Option<Money>) -> String {
    to.map_or_else(|| "∞".to_string(), |to| to.to_string())
}

/// Validate `brackets` and build the calculator selected by `kind`.
pub fn build_index(kind: CalculatorKind, brackets: Vec<TaxBracket>) -> Result<TaxIndex, TaxError> {
    TaxIndex::from_brackets(kind, brackets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texas_scenarios() {
        let schedule = SampleDataset::Texas.schedule().unwrap();
        let index = TaxIndex::build(CalculatorKind::Region, &schedule).unwrap();
        assert_eq!(
            index.compute_tax(Money::dollars(10_275)).unwrap(),
            Money::cents(102_750)
        );
        assert_eq!(
            index.compute_tax(Money::dollars(1_000_000)).unwrap(),
            Money::cents(33_295_500)
        );
    }

    #[test]
    fn single_bracket_flat_tax() {
        let brackets = vec![TaxBracket::unbounded(Percent::basis_points(100), Money::ZERO)];
        for kind in CalculatorKind::ALL {
            let index = build_index(kind, brackets.clone()).unwrap();
            assert_eq!(index.compute_tax(Money::dollars(1)).unwrap(), Money::cents(1), "{kind}");
            assert_eq!(index.compute_tax(Money::ZERO).unwrap(), Money::ZERO, "{kind}");
        }
    }

    #[test]
    fn invalid_schedules_are_reported() {
        let err = build_index(CalculatorKind::Gcd, vec![]).unwrap_err();
        assert_eq!(err, TaxError::InvalidBracketSchedule(ScheduleError::Empty));
        assert_eq!(
            err.to_string(),
            "invalid bracket schedule: a schedule needs at least one bracket"
        );
    }

    #[test]
    fn domain_error_formats_unbounded_brackets() {
        let err = TaxError::DomainError {
            income: Money::cents(5),
            from: Money::dollars(1),
            to: None,
        };
        assert_eq!(err.to_string(), "income $0.05 lies outside bracket [$1, ∞)");
    }
}
