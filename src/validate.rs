//! Cross-check any calculator against the linear reference.
//!
//! For every bracket the validator probes its first cent, its last cent and a
//! handful of seeded random incomes inside it. The unbounded bracket is
//! sampled up to twice its lower bound ($100 when it starts at zero).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::brackets::{BracketSchedule, TaxBracket};
use crate::calculators::{LinearTaxCalculator, TaxCalculator};
use crate::money::Money;
use crate::TaxError;

/// Default random probes per bracket.
pub const SAMPLES_PER_BRACKET: usize = 10;

/// Errors reported by [`Validator`].
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The calculator disagreed with the linear reference.
    #[error("{calculator} computed {actual} on {income} but the linear reference computed {expected}")]
    Mismatch {
        /// Name of the calculator under test.
        calculator: &'static str,
        /// Probed income.
        income: Money,
        /// Tax from the linear reference.
        expected: Money,
        /// Tax from the calculator under test.
        actual: Money,
    },

    /// Either calculator failed outright.
    #[error(transparent)]
    Tax(#[from] TaxError),
}

/// Validator tuning.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Random probes per bracket (capped by the bracket width in cents).
    pub samples_per_bracket: usize,
    /// RNG seed for the random probes.
    pub seed: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            samples_per_bracket: SAMPLES_PER_BRACKET,
            seed: 0,
        }
    }
}

impl ValidatorConfig {
    /// Set the number of random probes per bracket.
    pub fn with_samples_per_bracket(mut self, samples: usize) -> Self {
        self.samples_per_bracket = samples;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Name of the validated calculator.
    pub calculator: &'static str,
    /// Number of incomes probed.
    pub checked: usize,
}

/// Compares calculators against [`LinearTaxCalculator`].
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    /// Create a validator.
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Probe `calculator` over `schedule`, stopping at the first mismatch.
    pub fn validate(
        &self,
        calculator: &dyn TaxCalculator,
        schedule: &BracketSchedule,
    ) -> Result<ValidationReport, ValidationError> {
        let reference = LinearTaxCalculator::new(schedule);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut checked = 0;

        let mut check = |income: Money| -> Result<(), ValidationError> {
            let expected = reference.compute_tax(income)?;
            let actual = calculator.compute_tax(income)?;
            checked += 1;
            if expected != actual {
                return Err(ValidationError::Mismatch {
                    calculator: calculator.name(),
                    income,
                    expected,
                    actual,
                });
            }
            Ok(())
        };

        for bracket in schedule {
            check(bracket.from)?;
            for income in self.random_incomes(bracket, &mut rng)? {
                check(income)?;
            }
            if let Some(to) = bracket.to {
                check(to.checked_sub(Money::cents(1)).map_err(TaxError::from)?)?;
            }
        }

        debug!(calculator = calculator.name(), checked, "validation passed");
        Ok(ValidationReport {
            calculator: calculator.name(),
            checked,
        })
    }

    fn random_incomes(
        &self,
        bracket: &TaxBracket,
        rng: &mut StdRng,
    ) -> Result<Vec<Money>, TaxError> {
        let samples = match bracket.width() {
            Some(width) => self
                .config
                .samples_per_bracket
                .min(usize::try_from(width).unwrap_or(usize::MAX)),
            None => self.config.samples_per_bracket,
        };
        let upper = match bracket.to {
            Some(to) => to,
            None if bracket.from == Money::ZERO => Money::dollars(100),
            None => bracket.from.times(2)?,
        };

        (0..samples)
            .map(|_| Ok(Money::of_cents(rng.gen_range(bracket.from.as_cents()..upper.as_cents()))?))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brackets::SampleDataset;
    use crate::calculators::{CalculatorKind, TaxIndex};

    /// Always one cent too much.
    #[derive(Debug)]
    struct OffByOne(LinearTaxCalculator);

    impl TaxCalculator for OffByOne {
        fn name(&self) -> &'static str {
            "off-by-one"
        }

        fn compute_tax(&self, income: Money) -> Result<Money, TaxError> {
            Ok(self.0.compute_tax(income)? + Money::cents(1))
        }
    }

    #[test]
    fn quantized_indexes_pass_on_texas() {
        let schedule = SampleDataset::Texas.schedule().unwrap();
        let validator = Validator::new(ValidatorConfig::default().with_seed(7));
        for kind in CalculatorKind::QUANTIZED {
            let index = TaxIndex::build(kind, &schedule).unwrap();
            let report = validator.validate(&index, &schedule).unwrap();
            // first + last cent of 6 bounded brackets, first cent of the highest,
            // 10 random probes in each of 7 brackets
            assert_eq!(report.checked, 6 * 2 + 1 + 7 * 10);
            assert_eq!(report.calculator, kind.name());
        }
    }

    #[test]
    fn reports_the_first_mismatch() {
        let schedule = SampleDataset::TinyRange.schedule().unwrap();
        let wrong = OffByOne(LinearTaxCalculator::new(&schedule));
        let err = Validator::default().validate(&wrong, &schedule).unwrap_err();
        match err {
            ValidationError::Mismatch {
                calculator,
                income,
                expected,
                actual,
            } => {
                assert_eq!(calculator, "off-by-one");
                assert_eq!(income, Money::ZERO);
                assert_eq!(expected, Money::ZERO);
                assert_eq!(actual, Money::cents(1));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn narrow_brackets_cap_random_probes() {
        let schedule = BracketSchedule::from_lower_bounds(&[
            (crate::money::Percent::percent(10), Money::ZERO),
            (crate::money::Percent::percent(20), Money::cents(3)),
        ])
        .unwrap();
        let index = TaxIndex::build(CalculatorKind::Region, &schedule).unwrap();
        let report = Validator::default().validate(&index, &schedule).unwrap();
        // [0, 3): 2 edges + 3 probes; [3, ∞): 1 edge + 10 probes
        assert_eq!(report.checked, 16);
    }
}
