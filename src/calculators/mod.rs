//! Tax calculators over a bracket schedule, from the O(N) reference walk to
//! the constant-time quantized indexes.
//!
//! | Kind | Query | Memory |
//! |------|-------|--------|
//! | `Linear` | O(N) walk | schedule only |
//! | `LogN` | binary search | chain |
//! | `Memorized` | O(1), one slot per cent | range |
//! | `Gcd` | O(1), one slot per GCD of widths | range / gcd |
//! | `MinBracket` | O(1) + one correction step | range / narrowest width |
//! | `Region` | O(1) + one correction step | ≈ range / local narrowest width |

mod gcd;
mod linear;
mod log_n;
mod memorized;
mod min_bracket;
mod quantized;
mod region;

use std::fmt;

pub use gcd::{bracket_width_gcd, GcdTaxCalculator};
pub use linear::LinearTaxCalculator;
pub use log_n::LogNTaxCalculator;
pub use memorized::MemorizedTaxCalculator;
pub use min_bracket::MinBracketTaxCalculator;
pub use quantized::{Correction, QuantizedTable, Quantum};
pub use region::{Region, RegionConfig, RegionTaxCalculator, REGION_SIZE_MULTIPLIER};

use crate::brackets::{BracketSchedule, TaxBracket};
use crate::money::Money;
use crate::space::DeepSize;
use crate::TaxError;

/// Anything that turns an income into the total tax owed.
pub trait TaxCalculator: fmt::Debug + Send + Sync {
    /// Short identifier used in reports.
    fn name(&self) -> &'static str;

    /// Total tax owed on `income`.
    fn compute_tax(&self, income: Money) -> Result<Money, TaxError>;
}

/// Selects which calculator [`TaxIndex::build`] constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum CalculatorKind {
    /// Reference O(N) walk over the brackets.
    Linear,
    /// Binary search over the accumulated chain.
    LogN,
    /// One table slot per cent below the highest bracket.
    Memorized,
    /// Table quantized by the GCD of all bracket widths.
    Gcd,
    /// Table quantized by the narrowest bracket width.
    MinBracket,
    /// Uniform regions, each with its own chunk size.
    Region,
}

impl CalculatorKind {
    /// Every kind, slowest first.
    pub const ALL: [CalculatorKind; 6] = [
        CalculatorKind::Linear,
        CalculatorKind::LogN,
        CalculatorKind::Memorized,
        CalculatorKind::Gcd,
        CalculatorKind::MinBracket,
        CalculatorKind::Region,
    ];

    /// The constant-time kinds whose memory is worth comparing.
    pub const QUANTIZED: [CalculatorKind; 3] = [
        CalculatorKind::Gcd,
        CalculatorKind::MinBracket,
        CalculatorKind::Region,
    ];

    /// Short identifier used in reports.
    pub fn name(self) -> &'static str {
        match self {
            CalculatorKind::Linear => "linear",
            CalculatorKind::LogN => "log-n",
            CalculatorKind::Memorized => "memorized",
            CalculatorKind::Gcd => "gcd",
            CalculatorKind::MinBracket => "min-bracket",
            CalculatorKind::Region => "region",
        }
    }
}

impl fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A built calculator of any kind.
///
/// Immutable once built; share it freely across threads.
#[derive(Debug, Clone)]
pub enum TaxIndex {
    /// See [`LinearTaxCalculator`].
    Linear(LinearTaxCalculator),
    /// See [`LogNTaxCalculator`].
    LogN(LogNTaxCalculator),
    /// See [`MemorizedTaxCalculator`].
    Memorized(MemorizedTaxCalculator),
    /// See [`GcdTaxCalculator`].
    Gcd(GcdTaxCalculator),
    /// See [`MinBracketTaxCalculator`].
    MinBracket(MinBracketTaxCalculator),
    /// See [`RegionTaxCalculator`].
    Region(RegionTaxCalculator),
}

impl TaxIndex {
    /// Build `kind` over an already validated schedule.
    pub fn build(kind: CalculatorKind, schedule: &BracketSchedule) -> Result<Self, TaxError> {
        Ok(match kind {
            CalculatorKind::Linear => TaxIndex::Linear(LinearTaxCalculator::new(schedule)),
            CalculatorKind::LogN => TaxIndex::LogN(LogNTaxCalculator::new(schedule)),
            CalculatorKind::Memorized => TaxIndex::Memorized(MemorizedTaxCalculator::new(schedule)?),
            CalculatorKind::Gcd => TaxIndex::Gcd(GcdTaxCalculator::new(schedule)?),
            CalculatorKind::MinBracket => {
                TaxIndex::MinBracket(MinBracketTaxCalculator::new(schedule)?)
            }
            CalculatorKind::Region => TaxIndex::Region(RegionTaxCalculator::new(schedule)?),
        })
    }

    /// Validate raw brackets, then build `kind`.
    pub fn from_brackets(kind: CalculatorKind, brackets: Vec<TaxBracket>) -> Result<Self, TaxError> {
        let schedule = BracketSchedule::new(brackets)?;
        Self::build(kind, &schedule)
    }

    /// Which kind this is.
    pub fn kind(&self) -> CalculatorKind {
        match self {
            TaxIndex::Linear(_) => CalculatorKind::Linear,
            TaxIndex::LogN(_) => CalculatorKind::LogN,
            TaxIndex::Memorized(_) => CalculatorKind::Memorized,
            TaxIndex::Gcd(_) => CalculatorKind::Gcd,
            TaxIndex::MinBracket(_) => CalculatorKind::MinBracket,
            TaxIndex::Region(_) => CalculatorKind::Region,
        }
    }

    fn as_calculator(&self) -> &dyn TaxCalculator {
        match self {
            TaxIndex::Linear(c) => c,
            TaxIndex::LogN(c) => c,
            TaxIndex::Memorized(c) => c,
            TaxIndex::Gcd(c) => c,
            TaxIndex::MinBracket(c) => c,
            TaxIndex::Region(c) => c,
        }
    }
}

impl TaxCalculator for TaxIndex {
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn compute_tax(&self, income: Money) -> Result<Money, TaxError> {
        self.as_calculator().compute_tax(income)
    }
}

impl DeepSize for TaxIndex {
    fn heap_size(&self) -> usize {
        match self {
            TaxIndex::Linear(c) => c.heap_size(),
            TaxIndex::LogN(c) => c.heap_size(),
            TaxIndex::Memorized(c) => c.heap_size(),
            TaxIndex::Gcd(c) => c.heap_size(),
            TaxIndex::MinBracket(c) => c.heap_size(),
            TaxIndex::Region(c) => c.heap_size(),
        }
    }

    /// Size of the wrapped calculator, not of the (largest-variant) enum.
    fn deep_size(&self) -> usize {
        match self {
            TaxIndex::Linear(c) => c.deep_size(),
            TaxIndex::LogN(c) => c.deep_size(),
            TaxIndex::Memorized(c) => c.deep_size(),
            TaxIndex::Gcd(c) => c.deep_size(),
            TaxIndex::MinBracket(c) => c.deep_size(),
            TaxIndex::Region(c) => c.deep_size(),
        }
    }
}
