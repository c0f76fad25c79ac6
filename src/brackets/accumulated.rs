use crate::brackets::BracketSchedule;
use crate::money::{Money, Percent};
use crate::space::DeepSize;
use crate::TaxError;

/// Position of a bracket inside an [`AccumulatedChain`].
///
/// Two bytes are enough because a schedule holds at most
/// [`MAX_BRACKETS`](crate::brackets::MAX_BRACKETS) brackets, which keeps the
/// chunk tables of the quantized indexes compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BracketId(u16);

impl BracketId {
    /// The first (lowest) bracket.
    pub const FIRST: BracketId = BracketId(0);

    /// Wrap a bracket ordinal. Callers guarantee `index < MAX_BRACKETS`.
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index <= u16::MAX as usize);
        Self(index as u16)
    }

    /// Index into the chain's node array.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Bracket annotated with the tax owed on all income below its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccumulatedBracket {
    /// Inclusive lower bound.
    pub from: Money,
    /// Marginal rate.
    pub rate: Percent,
    /// Total tax owed on income in `[0, from)`.
    pub accumulated: Money,
    /// Following bracket; `None` for the highest bracket.
    pub next: Option<BracketId>,
}

/// Singly-linked chain of accumulated brackets stored as an array.
///
/// `next` links are array positions, so the chain owns every node and
/// "advance to the next bracket" stays O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatedChain {
    nodes: Vec<AccumulatedBracket>,
}

impl AccumulatedChain {
    /// Single left-to-right pass accumulating the full-width tax of every
    /// bounded bracket.
    pub fn build(schedule: &BracketSchedule) -> Self {
        let count = schedule.len();
        let mut nodes = Vec::with_capacity(count);
        let mut running_total = Money::ZERO;

        for (idx, bracket) in schedule.iter().enumerate() {
            nodes.push(AccumulatedBracket {
                from: bracket.from,
                rate: bracket.rate,
                accumulated: running_total,
                next: (idx + 1 < count).then(|| BracketId::new(idx + 1)),
            });
            if let Some(to) = bracket.to {
                let width = to.checked_sub(bracket.from).unwrap_or(Money::ZERO);
                running_total = running_total + bracket.rate * width;
            }
        }

        Self { nodes }
    }

    /// Node for `id`.
    #[inline]
    pub fn get(&self, id: BracketId) -> &AccumulatedBracket {
        &self.nodes[id.index()]
    }

    /// All nodes in ascending order.
    pub fn nodes(&self) -> &[AccumulatedBracket] {
        &self.nodes
    }

    /// Number of brackets.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the chain is empty (never true for a chain built from a schedule).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The unbounded highest bracket.
    pub fn highest(&self) -> BracketId {
        BracketId::new(self.nodes.len().saturating_sub(1))
    }

    /// Following bracket, `None` for the highest.
    #[inline]
    pub fn next(&self, id: BracketId) -> Option<BracketId> {
        self.get(id).next
    }

    /// Exclusive upper bound of `id`, derived from the next bracket's start.
    #[inline]
    pub fn upper_bound(&self, id: BracketId) -> Option<Money> {
        self.next(id).map(|next| self.get(next).from)
    }

    /// Whether `income` lies inside bracket `id`.
    #[inline]
    pub fn contains(&self, id: BracketId, income: Money) -> bool {
        income >= self.get(id).from && self.upper_bound(id).map_or(true, |to| income < to)
    }

    /// Given an approximate bracket whose start is at or below `income`,
    /// step to the following bracket when `income` has crossed its upper
    /// bound. One step suffices whenever at most one bracket boundary lies
    /// between the approximation point and `income`.
    #[inline]
    pub fn correct(&self, approximate: BracketId, income: Money) -> BracketId {
        match (self.upper_bound(approximate), self.next(approximate)) {
            (Some(to), Some(next)) if income >= to => next,
            _ => approximate,
        }
    }

    /// Total tax for `income`, which must lie inside bracket `id`.
    pub fn compute_total_tax(&self, id: BracketId, income: Money) -> Result<Money, TaxError> {
        let node = self.get(id);
        let to = self.upper_bound(id);
        if !self.contains(id, income) {
            return Err(TaxError::DomainError {
                income,
                from: node.from,
                to,
            });
        }

        Ok(node.accumulated + node.rate * income.checked_sub(node.from)?)
    }
}

impl DeepSize for BracketId {}
impl DeepSize for AccumulatedBracket {}

impl DeepSize for AccumulatedChain {
    fn heap_size(&self) -> usize {
        self.nodes.heap_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brackets::SampleDataset;

    #[test]
    fn accumulates_full_width_tax() {
        let schedule = SampleDataset::Texas.schedule().unwrap();
        let chain = AccumulatedChain::build(&schedule);

        assert_eq!(chain.len(), 7);
        assert_eq!(chain.get(BracketId::FIRST).accumulated, Money::ZERO);
        // 10% of $10,275
        assert_eq!(chain.get(BracketId::new(1)).accumulated, Money::cents(102_750));
        // + 12% of $31,500
        assert_eq!(chain.get(BracketId::new(2)).accumulated, Money::cents(480_750));
        assert_eq!(chain.next(chain.highest()), None);
        assert_eq!(chain.upper_bound(chain.highest()), None);
    }

    #[test]
    fn accumulated_values_are_monotonic() {
        let schedule = SampleDataset::Hawaii.schedule().unwrap();
        let chain = AccumulatedChain::build(&schedule);
        for pair in chain.nodes().windows(2) {
            assert!(pair[0].accumulated <= pair[1].accumulated);
        }
    }

    #[test]
    fn links_form_a_single_forward_chain() {
        let schedule = SampleDataset::TinyRange.schedule().unwrap();
        let chain = AccumulatedChain::build(&schedule);

        let mut visited = 1;
        let mut cursor = BracketId::FIRST;
        while let Some(next) = chain.next(cursor) {
            assert!(next > cursor);
            assert_eq!(chain.upper_bound(cursor), Some(chain.get(next).from));
            cursor = next;
            visited += 1;
        }
        assert_eq!(visited, chain.len());
        assert_eq!(cursor, chain.highest());
    }

    #[test]
    fn total_tax_rejects_income_outside_bracket() {
        let schedule = SampleDataset::Texas.schedule().unwrap();
        let chain = AccumulatedChain::build(&schedule);

        assert!(matches!(
            chain.compute_total_tax(BracketId::FIRST, Money::dollars(10_275)),
            Err(TaxError::DomainError { .. })
        ));
        assert!(matches!(
            chain.compute_total_tax(BracketId::new(1), Money::dollars(10_274)),
            Err(TaxError::DomainError { .. })
        ));
        assert_eq!(
            chain
                .compute_total_tax(BracketId::new(1), Money::dollars(10_275))
                .unwrap(),
            Money::cents(102_750)
        );
    }

    #[test]
    fn correction_steps_across_one_boundary() {
        let schedule = SampleDataset::Texas.schedule().unwrap();
        let chain = AccumulatedChain::build(&schedule);

        assert_eq!(chain.correct(BracketId::FIRST, Money::dollars(100)), BracketId::FIRST);
        assert_eq!(
            chain.correct(BracketId::FIRST, Money::dollars(10_275)),
            BracketId::new(1)
        );
        let highest = chain.highest();
        assert_eq!(chain.correct(highest, Money::dollars(10_000_000)), highest);
    }
}
