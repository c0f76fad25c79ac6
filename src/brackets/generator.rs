//! Random bracket schedules for stress tests and memory analysis

use rand::seq::index;
use rand::Rng;
use thiserror::Error;

use crate::brackets::{BracketSchedule, ScheduleError, MAX_BRACKETS};
use crate::money::{Money, Percent, BASIS_POINTS_PER_100_PERCENT};

/// Rejected generator requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// Asked for zero brackets.
    #[error("the number of tax brackets must be positive")]
    NoBrackets,

    /// Asked for more brackets than there are distinct rates.
    #[error("cannot create more than {max} tax brackets (requested {requested})")]
    TooManyBrackets {
        /// Requested bracket count.
        requested: usize,
        /// Allowed maximum.
        max: usize,
    },

    /// A single bracket must start (and therefore end the range) at $0.
    #[error("the lower bound of the highest bracket must be $0 when creating a single bracket")]
    SingleBracketRange,

    /// Not enough whole-dollar lower bounds below the highest bracket.
    #[error("cannot create {num_brackets} brackets if the highest bracket starts at ${highest_dollars}")]
    RangeTooSmall {
        /// Requested bracket count.
        num_brackets: usize,
        /// Requested lower bound of the highest bracket, in dollars.
        highest_dollars: u32,
    },

    /// Generated brackets failed validation.
    #[error("generated schedule is invalid: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Default highest-bracket lower bound: $100 per bracket.
pub fn default_highest_bracket_dollars(num_brackets: usize) -> u32 {
    (num_brackets as u32).saturating_mul(100)
}

/// Generate a valid schedule of `num_brackets` brackets whose highest
/// bracket starts at `highest_dollars`.
///
/// Lower bounds are distinct whole-dollar amounts drawn uniformly from
/// `[0, highest_dollars]` (always including both ends); rates are distinct
/// basis-point values below 100%, sorted ascending.
pub fn generate_tax_brackets<R: Rng + ?Sized>(
    num_brackets: usize,
    highest_dollars: u32,
    rng: &mut R,
) -> Result<BracketSchedule, GeneratorError> {
    if num_brackets == 0 {
        return Err(GeneratorError::NoBrackets);
    }
    if num_brackets > MAX_BRACKETS {
        return Err(GeneratorError::TooManyBrackets {
            requested: num_brackets,
            max: MAX_BRACKETS,
        });
    }
    if num_brackets == 1 && highest_dollars != 0 {
        return Err(GeneratorError::SingleBracketRange);
    }
    if (highest_dollars as usize) + 1 < num_brackets {
        return Err(GeneratorError::RangeTooSmall {
            num_brackets,
            highest_dollars,
        });
    }

    let mut lower_bounds: Vec<u32> = vec![0];
    if num_brackets > 1 {
        lower_bounds.push(highest_dollars);
        // interior bounds come from [1, highest)
        let interior = index::sample(rng, highest_dollars as usize - 1, num_brackets - 2);
        lower_bounds.extend(interior.iter().map(|i| i as u32 + 1));
    }
    lower_bounds.sort_unstable();

    let mut rates: Vec<u32> = index::sample(rng, BASIS_POINTS_PER_100_PERCENT as usize, num_brackets)
        .iter()
        .map(|bps| bps as u32)
        .collect();
    rates.sort_unstable();

    let bounds: Vec<(Percent, Money)> = rates
        .into_iter()
        .zip(lower_bounds)
        .map(|(bps, dollars)| (Percent::basis_points(bps), Money::dollars(dollars)))
        .collect();

    Ok(BracketSchedule::from_lower_bounds(&bounds)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_case::test_case;

    #[test_case(1, 0)]
    #[test_case(2, 1)]
    #[test_case(10, 1_000)]
    #[test_case(10, 9)]
    #[test_case(250, 350_000)]
    fn generates_valid_schedules(num_brackets: usize, highest_dollars: u32) {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let schedule = generate_tax_brackets(num_brackets, highest_dollars, &mut rng).unwrap();
            assert_eq!(schedule.len(), num_brackets);
            assert_eq!(schedule.highest().from, Money::dollars(highest_dollars));
        }
    }

    #[test]
    fn max_bracket_count_is_reachable() {
        let mut rng = StdRng::seed_from_u64(11);
        let schedule = generate_tax_brackets(MAX_BRACKETS, 20_000, &mut rng).unwrap();
        assert_eq!(schedule.len(), MAX_BRACKETS);
    }

    #[test]
    fn rejects_impossible_requests() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate_tax_brackets(0, 100, &mut rng),
            Err(GeneratorError::NoBrackets)
        );
        assert_eq!(
            generate_tax_brackets(1, 5, &mut rng),
            Err(GeneratorError::SingleBracketRange)
        );
        assert!(matches!(
            generate_tax_brackets(MAX_BRACKETS + 1, u32::MAX, &mut rng),
            Err(GeneratorError::TooManyBrackets { .. })
        ));
        assert!(matches!(
            generate_tax_brackets(10, 8, &mut rng),
            Err(GeneratorError::RangeTooSmall { .. })
        ));
    }

    #[test]
    fn same_seed_same_schedule() {
        let a = generate_tax_brackets(25, 50_000, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = generate_tax_brackets(25, 50_000, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }
}
