use crate::brackets::BracketSchedule;
use crate::calculators::TaxCalculator;
use crate::money::Money;
use crate::space::DeepSize;
use crate::TaxError;

/// Reference calculator: sums the bracket tax of every bracket that starts
/// below the income. O(N) per query.
#[derive(Debug, Clone)]
pub struct LinearTaxCalculator {
    schedule: BracketSchedule,
}

impl LinearTaxCalculator {
    /// Keep a copy of the schedule.
    pub fn new(schedule: &BracketSchedule) -> Self {
        Self {
            schedule: schedule.clone(),
        }
    }
}

impl TaxCalculator for LinearTaxCalculator {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn compute_tax(&self, income: Money) -> Result<Money, TaxError> {
        let mut total = Money::ZERO;
        for bracket in &self.schedule {
            if income <= bracket.from {
                break;
            }
            total = total.checked_add(bracket.compute_bracket_tax(income)?)?;
        }
        Ok(total)
    }
}

impl DeepSize for LinearTaxCalculator {
    fn heap_size(&self) -> usize {
        self.schedule.heap_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brackets::SampleDataset;
    use crate::money::Percent;
    use test_case::test_case;

    fn texas() -> LinearTaxCalculator {
        LinearTaxCalculator::new(&SampleDataset::Texas.schedule().unwrap())
    }

    #[test_case(Money::ZERO, Money::ZERO)]
    #[test_case(Money::dollars(100), Money::dollars(10))]
    #[test_case(Money::dollars(10_275), Money::cents(102_750))]
    #[test_case(Money::dollars(20_000), Money::cents(219_450))]
    #[test_case(Money::dollars(1_000_000), Money::cents(33_295_500))]
    fn texas_totals(income: Money, expected: Money) {
        assert_eq!(texas().compute_tax(income).unwrap(), expected);
    }

    #[test]
    fn single_bracket_is_a_flat_rate() {
        let schedule =
            BracketSchedule::from_lower_bounds(&[(Percent::basis_points(100), Money::ZERO)]).unwrap();
        let calculator = LinearTaxCalculator::new(&schedule);
        assert_eq!(
            calculator.compute_tax(Money::dollars(250)).unwrap(),
            Money::cents(250)
        );
    }
}
