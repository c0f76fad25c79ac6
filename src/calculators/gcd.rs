use tracing::{debug, warn};

use crate::brackets::{AccumulatedChain, BracketSchedule};
use crate::calculators::{Correction, QuantizedTable, Quantum, TaxCalculator};
use crate::money::Money;
use crate::space::DeepSize;
use crate::TaxError;

/// Greatest common divisor of every bounded bracket width, 1 when there are none.
pub fn bracket_width_gcd(schedule: &BracketSchedule) -> i64 {
    schedule.finite_widths().reduce(gcd).unwrap_or(1)
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a, b);
    while a != 0 {
        (a, b) = (b % a, a);
    }
    b
}

/// Slots every GCD-of-widths cents; every boundary lands on a slot edge, so
/// lookups are exact.
#[derive(Debug, Clone)]
pub struct GcdTaxCalculator {
    chain: AccumulatedChain,
    table: QuantizedTable,
}

impl GcdTaxCalculator {
    /// Build the GCD-quantized table.
    pub fn new(schedule: &BracketSchedule) -> Result<Self, TaxError> {
        let divisor = bracket_width_gcd(schedule);
        if divisor == 1 && schedule.len() > 1 {
            warn!(
                range = schedule.range(),
                "bracket widths share no common divisor, falling back to one slot per cent"
            );
        }

        let chain = AccumulatedChain::build(schedule);
        let table = QuantizedTable::build(
            &chain,
            schedule.range(),
            Quantum::new(divisor)?,
            Correction::Exact,
        )?;
        debug!(gcd = divisor, slots = table.len(), "built gcd index");
        Ok(Self { chain, table })
    }

    /// The slot stride in cents.
    pub fn divisor(&self) -> i64 {
        self.table.quantum().cents()
    }
}

impl TaxCalculator for GcdTaxCalculator {
    fn name(&self) -> &'static str {
        "gcd"
    }

    fn compute_tax(&self, income: Money) -> Result<Money, TaxError> {
        let id = self
            .table
            .resolve(&self.chain, income)
            .unwrap_or_else(|| self.chain.highest());
        self.chain.compute_total_tax(id, income)
    }
}

impl DeepSize for GcdTaxCalculator {
    fn heap_size(&self) -> usize {
        self.chain.heap_size() + self.table.heap_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brackets::SampleDataset;
    use crate::money::Percent;
    use test_case::test_case;

    #[test_case(12, 18, 6)]
    #[test_case(7, 13, 1)]
    #[test_case(0, 9, 9)]
    #[test_case(100, 100, 100)]
    fn gcd_of_pairs(a: i64, b: i64, expected: i64) {
        assert_eq!(gcd(a, b), expected);
    }

    #[test]
    fn texas_widths_share_whole_dollars() {
        let schedule = SampleDataset::Texas.schedule().unwrap();
        // 10,275 / 31,500 / 47,300 / 80,975 / 45,900 / 323,950 dollars
        assert_eq!(bracket_width_gcd(&schedule), 2_500);

        let calculator = GcdTaxCalculator::new(&schedule).unwrap();
        assert_eq!(calculator.divisor(), 2_500);
        assert_eq!(calculator.table.len(), 21_596);
    }

    #[test]
    fn single_bracket_uses_one_cent() {
        let schedule =
            BracketSchedule::from_lower_bounds(&[(Percent::basis_points(100), Money::ZERO)]).unwrap();
        assert_eq!(bracket_width_gcd(&schedule), 1);

        let calculator = GcdTaxCalculator::new(&schedule).unwrap();
        assert!(calculator.table.is_empty());
        assert_eq!(
            calculator.compute_tax(Money::dollars(250)).unwrap(),
            Money::cents(250)
        );
    }
}
