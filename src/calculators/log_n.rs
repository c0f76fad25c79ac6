use std::cmp::Ordering;

use crate::brackets::{AccumulatedChain, BracketId, BracketSchedule};
use crate::calculators::TaxCalculator;
use crate::money::Money;
use crate::space::DeepSize;
use crate::TaxError;

/// Binary search over the accumulated chain, then one multiply-add.
#[derive(Debug, Clone)]
pub struct LogNTaxCalculator {
    chain: AccumulatedChain,
}

impl LogNTaxCalculator {
    /// Build the accumulated chain for `schedule`.
    pub fn new(schedule: &BracketSchedule) -> Self {
        Self {
            chain: AccumulatedChain::build(schedule),
        }
    }

    /// Bracket containing `income`.
    pub fn find_bracket(&self, income: Money) -> Option<BracketId> {
        let chain = &self.chain;
        chain
            .nodes()
            .binary_search_by(|node| {
                if node.from > income {
                    Ordering::Greater
                } else if node.next.map_or(false, |next| chain.get(next).from <= income) {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .ok()
            .map(BracketId::new)
    }
}

impl TaxCalculator for LogNTaxCalculator {
    fn name(&self) -> &'static str {
        "log-n"
    }

    fn compute_tax(&self, income: Money) -> Result<Money, TaxError> {
        let id = self.find_bracket(income).unwrap_or_else(|| self.chain.highest());
        self.chain.compute_total_tax(id, income)
    }
}

impl DeepSize for LogNTaxCalculator {
    fn heap_size(&self) -> usize {
        self.chain.heap_size()
    }
}
