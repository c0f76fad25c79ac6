//! Fixed-stride lookup tables shared by the constant-time calculators.

use crate::brackets::{AccumulatedChain, BracketId};
use crate::money::Money;
use crate::space::DeepSize;
use crate::TaxError;

/// Positive stride, in cents, between consecutive table slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantum(i64);

impl Quantum {
    /// One slot per cent.
    pub const ONE_CENT: Quantum = Quantum(1);

    /// Reject strides that are not positive.
    pub fn new(cents: i64) -> Result<Self, TaxError> {
        if cents <= 0 {
            return Err(TaxError::UnsupportedQuantization(format!(
                "quantum must be a positive number of cents, got {cents}"
            )));
        }
        Ok(Self(cents))
    }

    /// Stride in cents.
    #[inline]
    pub fn cents(self) -> i64 {
        self.0
    }

    /// Slot holding `income`.
    #[inline]
    pub fn slot(self, income: Money) -> usize {
        (income.as_cents() / self.0) as usize
    }

    /// Slots needed to cover `[0, range)`.
    pub fn slots_for(self, range: i64) -> usize {
        (range / self.0 + i64::from(range % self.0 != 0)) as usize
    }
}

/// Reserve room for `additional` more entries, reporting an allocation the
/// process cannot satisfy as [`TaxError::UnsupportedQuantization`].
pub(crate) fn reserve_entries<T>(table: &mut Vec<T>, additional: usize) -> Result<(), TaxError> {
    table.try_reserve(additional).map_err(|err| {
        TaxError::UnsupportedQuantization(format!(
            "cannot allocate a table of {additional} slots: {err}"
        ))
    })
}

impl DeepSize for Quantum {}

/// How many bracket boundaries a slot may straddle, and therefore how a
/// looked-up bracket is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Every slot lies inside a single bracket; the lookup is exact.
    Exact,
    /// A slot may contain one boundary; step forward once if income crossed it.
    OneStep,
}

impl Correction {
    fn max_interior_boundaries(self) -> usize {
        match self {
            Correction::Exact => 0,
            Correction::OneStep => 1,
        }
    }
}

/// Bracket containing the start of each `quantum`-wide slot of `[0, range)`.
#[derive(Debug, Clone)]
pub struct QuantizedTable {
    quantum: Quantum,
    correction: Correction,
    slots: Vec<BracketId>,
}

impl QuantizedTable {
    /// Walk the chain once, recording the bracket at the start of each slot.
    ///
    /// Fails if any slot straddles more boundaries than `correction` can repair.
    pub fn build(
        chain: &AccumulatedChain,
        range: i64,
        quantum: Quantum,
        correction: Correction,
    ) -> Result<Self, TaxError> {
        let len = quantum.slots_for(range);
        let mut slots = Vec::new();
        reserve_entries(&mut slots, len)?;
        let mut cursor = BracketId::FIRST;

        for slot in 0..len {
            let slot_start = slot as i64 * quantum.cents();
            let slot_end = slot_start.saturating_add(quantum.cents());
            slots.push(cursor);

            let mut interior = 0;
            while let Some(to) = chain.upper_bound(cursor) {
                let to = to.as_cents();
                if to > slot_end {
                    break;
                }
                if to < slot_end {
                    interior += 1;
                }
                match chain.next(cursor) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
            if interior > correction.max_interior_boundaries() {
                return Err(TaxError::UnsupportedQuantization(format!(
                    "slot at {} cents spans {interior} bracket boundaries with a quantum of {} cents",
                    slot_start,
                    quantum.cents()
                )));
            }
        }

        Ok(Self {
            quantum,
            correction,
            slots,
        })
    }

    /// Bracket containing `income`, or `None` at or beyond the covered range.
    #[inline]
    pub fn resolve(&self, chain: &AccumulatedChain, income: Money) -> Option<BracketId> {
        let approximate = *self.slots.get(self.quantum.slot(income))?;
        Some(match self.correction {
            Correction::Exact => approximate,
            Correction::OneStep => chain.correct(approximate, income),
        })
    }

    /// Slot stride.
    pub fn quantum(&self) -> Quantum {
        self.quantum
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table covers nothing (single-bracket schedules).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl DeepSize for QuantizedTable {
    fn heap_size(&self) -> usize {
        self.slots.heap_size()
    }
}
