use tracing::debug;

use crate::brackets::{AccumulatedChain, BracketSchedule};
use crate::calculators::{Correction, QuantizedTable, Quantum, TaxCalculator};
use crate::money::Money;
use crate::space::DeepSize;
use crate::TaxError;

/// Slots as wide as the narrowest bracket.
///
/// No bracket fits strictly inside a slot, so a slot holds at most one
/// boundary and a single forward step repairs the lookup.
#[derive(Debug, Clone)]
pub struct MinBracketTaxCalculator {
    chain: AccumulatedChain,
    table: QuantizedTable,
}

impl MinBracketTaxCalculator {
    /// Build the table quantized by the narrowest bounded width.
    pub fn new(schedule: &BracketSchedule) -> Result<Self, TaxError> {
        let chunk_size = Quantum::new(schedule.narrowest_width().unwrap_or(1))?;
        let chain = AccumulatedChain::build(schedule);
        let table = QuantizedTable::build(&chain, schedule.range(), chunk_size, Correction::OneStep)?;
        debug!(
            chunk_size = chunk_size.cents(),
            chunks = table.len(),
            "built min-bracket index"
        );
        Ok(Self { chain, table })
    }

    /// Width of every chunk.
    pub fn chunk_size(&self) -> Quantum {
        self.table.quantum()
    }

    /// Number of chunks covering `[0, highest.from)`.
    pub fn chunk_count(&self) -> usize {
        self.table.len()
    }
}

impl TaxCalculator for MinBracketTaxCalculator {
    fn name(&self) -> &'static str {
        "min-bracket"
    }

    fn compute_tax(&self, income: Money) -> Result<Money, TaxError> {
        let highest = self.chain.highest();
        if income >= self.chain.get(highest).from {
            return self.chain.compute_total_tax(highest, income);
        }

        let id = self
            .table
            .resolve(&self.chain, income)
            .ok_or(TaxError::DomainError {
                income,
                from: Money::ZERO,
                to: Some(self.chain.get(highest).from),
            })?;
        self.chain.compute_total_tax(id, income)
    }
}

impl DeepSize for MinBracketTaxCalculator {
    fn heap_size(&self) -> usize {
        self.chain.heap_size() + self.table.heap_size()
    }
}
