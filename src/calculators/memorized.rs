use tracing::debug;

use crate::brackets::{AccumulatedChain, BracketSchedule};
use crate::calculators::{Correction, QuantizedTable, Quantum, TaxCalculator};
use crate::money::Money;
use crate::space::DeepSize;
use crate::TaxError;

/// One table slot per cent below the highest bracket.
///
/// The baseline every quantized index improves on: O(1) queries, but memory
/// grows with the full range in cents.
#[derive(Debug, Clone)]
pub struct MemorizedTaxCalculator {
    chain: AccumulatedChain,
    table: QuantizedTable,
}

impl MemorizedTaxCalculator {
    /// Build a cent-granular table over `[0, highest.from)`.
    pub fn new(schedule: &BracketSchedule) -> Result<Self, TaxError> {
        let chain = AccumulatedChain::build(schedule);
        let table = QuantizedTable::build(&chain, schedule.range(), Quantum::ONE_CENT, Correction::Exact)?;
        debug!(slots = table.len(), "built memorized index");
        Ok(Self { chain, table })
    }
}

impl TaxCalculator for MemorizedTaxCalculator {
    fn name(&self) -> &'static str {
        "memorized"
    }

    fn compute_tax(&self, income: Money) -> Result<Money, TaxError> {
        let id = self
            .table
            .resolve(&self.chain, income)
            .unwrap_or_else(|| self.chain.highest());
        self.chain.compute_total_tax(id, income)
    }
}

impl DeepSize for MemorizedTaxCalculator {
    fn heap_size(&self) -> usize {
        self.chain.heap_size() + self.table.heap_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brackets::SampleDataset;

    #[test]
    fn one_slot_per_cent() {
        let schedule = SampleDataset::TinyRange.schedule().unwrap();
        let calculator = MemorizedTaxCalculator::new(&schedule).unwrap();
        assert_eq!(calculator.table.len(), 539_900);
        assert_eq!(calculator.compute_tax(Money::dollars(102)).unwrap(), Money::cents(1_020));
        assert_eq!(calculator.compute_tax(Money::ZERO).unwrap(), Money::ZERO);
    }
}
