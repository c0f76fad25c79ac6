//! Region-partitioned index: uniform regions, each with its own chunk size.
//!
//! A single narrow bracket forces [`MinBracketTaxCalculator`] to use tiny
//! chunks everywhere. Splitting `[0, range)` into regions confines that cost
//! to the region the narrow bracket lives in.
//!
//! [`MinBracketTaxCalculator`]: crate::calculators::MinBracketTaxCalculator

use tracing::{debug, trace};

use crate::brackets::{AccumulatedChain, BracketId, BracketSchedule};
use crate::calculators::quantized::reserve_entries;
use crate::calculators::{Quantum, TaxCalculator};
use crate::money::Money;
use crate::space::DeepSize;
use crate::TaxError;

/// Region size multiplier; close to optimal across random schedules.
pub const REGION_SIZE_MULTIPLIER: u32 = 5;

/// Tuning for the region index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionConfig {
    /// Scales `sqrt(range × narrowest / sqrt(N))` into the region size.
    pub multiplier: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            multiplier: REGION_SIZE_MULTIPLIER,
        }
    }
}

impl RegionConfig {
    /// Region size for `schedule`:
    /// `multiplier × floor(sqrt(range × narrowest / sqrt(N)))`, at least one cent.
    pub fn region_size(&self, schedule: &BracketSchedule) -> Result<Quantum, TaxError> {
        if self.multiplier == 0 {
            return Err(TaxError::UnsupportedQuantization(
                "region size multiplier must be positive".to_string(),
            ));
        }
        let Some(narrowest) = schedule.narrowest_width() else {
            return Ok(Quantum::ONE_CENT);
        };

        let range = schedule.range() as f64;
        let brackets = schedule.len() as f64;
        let root = (range * narrowest as f64 / brackets.sqrt()).sqrt() as i64;
        Quantum::new(root.saturating_mul(i64::from(self.multiplier)).max(1))
    }
}

/// Where a region's chunks start in the shared chunk array, and how wide they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Index of the region's first chunk.
    pub chunk_offset: u32,
    /// Width of every chunk in the region (the last one may be truncated).
    pub chunk_size: Quantum,
}

impl Region {
    /// Chunk holding an income `remainder` cents past the region start.
    #[inline]
    pub fn chunk_index(&self, remainder: i64) -> usize {
        self.chunk_offset as usize + (remainder / self.chunk_size.cents()) as usize
    }
}

impl DeepSize for Region {}

/// Constant-time calculator over per-region chunk tables.
#[derive(Debug, Clone)]
pub struct RegionTaxCalculator {
    chain: AccumulatedChain,
    region_size: Quantum,
    regions: Vec<Region>,
    chunks: Vec<BracketId>,
}

impl RegionTaxCalculator {
    /// Build with the default multiplier.
    pub fn new(schedule: &BracketSchedule) -> Result<Self, TaxError> {
        Self::with_config(schedule, &RegionConfig::default())
    }

    /// Build with an explicit configuration.
    pub fn with_config(schedule: &BracketSchedule, config: &RegionConfig) -> Result<Self, TaxError> {
        let region_size = config.region_size(schedule)?;
        let chain = AccumulatedChain::build(schedule);
        let (regions, chunks) = build_regions(&chain, schedule.range(), region_size)?;

        debug!(
            region_size = region_size.cents(),
            regions = regions.len(),
            chunks = chunks.len(),
            "built region index"
        );

        Ok(Self {
            chain,
            region_size,
            regions,
            chunks,
        })
    }

    /// Width of every region in cents.
    pub fn region_size(&self) -> Quantum {
        self.region_size
    }

    /// Regions in ascending order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Total number of chunks across all regions.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    fn out_of_range(&self, income: Money) -> TaxError {
        TaxError::DomainError {
            income,
            from: Money::ZERO,
            to: Some(self.chain.get(self.chain.highest()).from),
        }
    }
}

impl TaxCalculator for RegionTaxCalculator {
    fn name(&self) -> &'static str {
        "region"
    }

    fn compute_tax(&self, income: Money) -> Result<Money, TaxError> {
        let highest = self.chain.highest();
        if income >= self.chain.get(highest).from {
            return self.chain.compute_total_tax(highest, income);
        }

        let cents = income.as_cents();
        let region_size = self.region_size.cents();
        let region_index = (cents / region_size) as usize;
        let region = self
            .regions
            .get(region_index)
            .ok_or_else(|| self.out_of_range(income))?;
        let remainder = cents - region_index as i64 * region_size;
        let approximate = *self
            .chunks
            .get(region.chunk_index(remainder))
            .ok_or_else(|| self.out_of_range(income))?;

        let id = self.chain.correct(approximate, income);
        self.chain.compute_total_tax(id, income)
    }
}

impl DeepSize for RegionTaxCalculator {
    fn heap_size(&self) -> usize {
        self.chain.heap_size() + self.regions.heap_size() + self.chunks.heap_size()
    }
}

/// Narrowest bracket lying strictly inside `(region_start, region_end)`,
/// scanning forward from `cursor`; the whole region when there is none.
fn chunk_size_for_region(
    chain: &AccumulatedChain,
    region_start: i64,
    region_end: i64,
    cursor: BracketId,
) -> i64 {
    let mut narrowest: Option<i64> = None;
    let mut current = Some(cursor);
    while let Some(id) = current {
        current = chain.next(id);
        let from = chain.get(id).from.as_cents();
        if from <= region_start {
            continue;
        }
        let Some(to) = chain.upper_bound(id).map(Money::as_cents) else {
            continue;
        };
        if to >= region_end {
            break;
        }
        let width = to - from;
        narrowest = Some(narrowest.map_or(width, |n| n.min(width)));
    }
    narrowest.unwrap_or(region_end - region_start)
}

/// Lay out regions of `region_size` over `[0, range)` and the bracket at the
/// start of every chunk.
///
/// Fails if a chunk would hold more than one bracket boundary, which the
/// single correction step could not repair.
fn build_regions(
    chain: &AccumulatedChain,
    range: i64,
    region_size: Quantum,
) -> Result<(Vec<Region>, Vec<BracketId>), TaxError> {
    let mut regions = Vec::new();
    reserve_entries(&mut regions, region_size.slots_for(range))?;
    let mut chunks = Vec::new();
    let mut cursor = BracketId::FIRST;
    let mut region_start = 0i64;

    while region_start < range {
        let region_end = region_start.saturating_add(region_size.cents());
        let chunk_size = Quantum::new(chunk_size_for_region(chain, region_start, region_end, cursor))?;
        let chunk_offset = u32::try_from(chunks.len()).map_err(|_| {
            TaxError::UnsupportedQuantization(format!(
                "more than {} chunks in a region index",
                u32::MAX
            ))
        })?;
        trace!(
            region_start,
            chunk_size = chunk_size.cents(),
            chunk_offset,
            "sized region"
        );
        regions.push(Region {
            chunk_offset,
            chunk_size,
        });
        reserve_entries(&mut chunks, chunk_size.slots_for(region_end - region_start))?;

        let mut chunk_start = region_start;
        while chunk_start < region_end {
            chunks.push(cursor);
            let chunk_end = chunk_start.saturating_add(chunk_size.cents()).min(region_end);

            // The next chunk, possibly in the next region, starts in `cursor`.
            let mut interior = 0;
            while let Some(to) = chain.upper_bound(cursor).map(Money::as_cents) {
                if to > chunk_end {
                    break;
                }
                if to < chunk_end {
                    interior += 1;
                }
                match chain.next(cursor) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
            if interior > 1 {
                return Err(TaxError::UnsupportedQuantization(format!(
                    "chunk at {chunk_start} cents spans {interior} bracket boundaries"
                )));
            }
            chunk_start = chunk_end;
        }
        region_start = region_end;
    }

    chunks.shrink_to_fit();
    Ok((regions, chunks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brackets::SampleDataset;
    use crate::calculators::{LinearTaxCalculator, MinBracketTaxCalculator};
    use crate::money::Percent;

    /// `[0, $10,000)`, a one-cent bracket, then the highest bracket.
    fn one_narrow_bracket() -> BracketSchedule {
        BracketSchedule::from_lower_bounds(&[
            (Percent::percent(10), Money::ZERO),
            (Percent::percent(20), Money::dollars(10_000)),
            (Percent::percent(30), Money::cents(1_000_001)),
        ])
        .unwrap()
    }

    #[test]
    fn region_size_follows_square_root_rule() {
        let texas = SampleDataset::Texas.schedule().unwrap();
        assert_eq!(
            RegionConfig::default().region_size(&texas).unwrap().cents(),
            22_895_125
        );
        assert_eq!(
            RegionConfig::default()
                .region_size(&one_narrow_bracket())
                .unwrap()
                .cents(),
            3_795
        );
    }

    #[test]
    fn single_bracket_region_size_is_one_cent() {
        let schedule =
            BracketSchedule::from_lower_bounds(&[(Percent::basis_points(100), Money::ZERO)]).unwrap();
        assert_eq!(
            RegionConfig::default().region_size(&schedule).unwrap(),
            Quantum::ONE_CENT
        );
        let calculator = RegionTaxCalculator::new(&schedule).unwrap();
        assert!(calculator.regions().is_empty());
        assert_eq!(
            calculator.compute_tax(Money::dollars(250)).unwrap(),
            Money::cents(250)
        );
    }

    #[test]
    fn zero_multiplier_is_rejected() {
        let texas = SampleDataset::Texas.schedule().unwrap();
        let config = RegionConfig { multiplier: 0 };
        assert!(matches!(
            RegionTaxCalculator::with_config(&texas, &config),
            Err(TaxError::UnsupportedQuantization(_))
        ));
    }

    #[test]
    fn narrow_bracket_only_shrinks_its_own_region() {
        let schedule = one_narrow_bracket();
        let calculator = RegionTaxCalculator::new(&schedule).unwrap();

        assert_eq!(calculator.regions().len(), 264);
        // 263 single-chunk regions plus one region of one-cent chunks.
        assert_eq!(calculator.chunk_count(), 263 + 3_795);
        let narrow: Vec<_> = calculator
            .regions()
            .iter()
            .filter(|region| region.chunk_size == Quantum::ONE_CENT)
            .collect();
        assert_eq!(narrow.len(), 1);

        let min_bracket = MinBracketTaxCalculator::new(&schedule).unwrap();
        assert!(calculator.deep_size() < min_bracket.deep_size());
    }

    #[test]
    fn agrees_with_linear_around_every_boundary() {
        for schedule in [SampleDataset::Hawaii.schedule().unwrap(), one_narrow_bracket()] {
            let region = RegionTaxCalculator::new(&schedule).unwrap();
            let linear = LinearTaxCalculator::new(&schedule);
            for bracket in &schedule {
                let from = bracket.from.as_cents();
                for cents in [from - 1, from, from + 1] {
                    let Ok(income) = Money::of_cents(cents) else {
                        continue;
                    };
                    assert_eq!(
                        region.compute_tax(income).unwrap(),
                        linear.compute_tax(income).unwrap(),
                        "income {income}"
                    );
                }
            }
        }
    }

    #[test]
    fn chunk_size_ignores_brackets_straddling_the_region() {
        let chain = AccumulatedChain::build(&one_narrow_bracket());
        // The first bracket starts at the region start; the last one is unbounded.
        assert_eq!(chunk_size_for_region(&chain, 0, 2_000_000, BracketId::FIRST), 1);
        assert_eq!(chunk_size_for_region(&chain, 0, 500, BracketId::FIRST), 500);
    }
}
