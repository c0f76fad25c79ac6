//! Monte Carlo memory measurement over random schedules

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::debug;

use crate::brackets::{generate_tax_brackets, generator::default_highest_bracket_dollars, GeneratorError};
use crate::calculators::{CalculatorKind, TaxIndex};
use crate::space::DeepSize;
use crate::TaxError;

/// Errors raised while running a memory simulation.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Random schedule generation failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// Index construction failed.
    #[error(transparent)]
    Index(#[from] TaxError),

    /// Simulation asked for zero samples.
    #[error("a simulation needs at least one sample")]
    NoSamples,
}

/// Parameters of one Monte Carlo memory simulation.
#[derive(Debug, Clone)]
pub struct MonteCarloConfig {
    /// Number of random schedules to build.
    pub num_samples: usize,
    /// Brackets per schedule.
    pub num_brackets: usize,
    /// Lower bound of the highest bracket, in dollars.
    pub highest_bracket_dollars: u32,
    /// RNG seed; the same seed reproduces the same schedules.
    pub seed: u64,
}

impl MonteCarloConfig {
    /// 1,000 samples of `num_brackets` brackets with the highest bracket at
    /// $100 per bracket.
    pub fn for_brackets(num_brackets: usize) -> Self {
        Self {
            num_samples: 1_000,
            num_brackets,
            highest_bracket_dollars: default_highest_bracket_dollars(num_brackets),
            seed: 0,
        }
    }

    /// Set the number of samples.
    pub fn with_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Set the highest-bracket lower bound.
    pub fn with_highest_bracket_dollars(mut self, dollars: u32) -> Self {
        self.highest_bracket_dollars = dollars;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Sorted deep sizes of every index built during a simulation.
#[derive(Debug, Clone)]
pub struct MemoryProfile {
    /// Index kind that was measured.
    pub kind: CalculatorKind,
    /// Deep sizes in bytes, ascending.
    pub sizes: Vec<usize>,
}

impl MemoryProfile {
    /// Interpolated percentile (0..=100) of the measured sizes.
    pub fn percentile(&self, p: u8) -> usize {
        percentile(&self.sizes, p).unwrap_or(0)
    }

    /// Largest measured size.
    pub fn max(&self) -> usize {
        self.sizes.last().copied().unwrap_or(0)
    }

    /// Verify every sample fits in `bound` bytes.
    pub fn satisfies_bound(&self, bound: usize) -> bool {
        self.max() <= bound
    }
}

/// Runs memory simulations for index kinds.
#[derive(Debug)]
pub struct MemoryAnalyzer {
    config: MonteCarloConfig,
}

impl MemoryAnalyzer {
    /// Create an analyzer for `config`.
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// Simulation parameters.
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Build `kind` over `num_samples` random schedules and record each
    /// index's deep size.
    pub fn measure(&self, kind: CalculatorKind) -> Result<MemoryProfile, AnalyzerError> {
        if self.config.num_samples == 0 {
            return Err(AnalyzerError::NoSamples);
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut sizes = Vec::with_capacity(self.config.num_samples);
        for _ in 0..self.config.num_samples {
            let schedule = generate_tax_brackets(
                self.config.num_brackets,
                self.config.highest_bracket_dollars,
                &mut rng,
            )?;
            let index = TaxIndex::build(kind, &schedule)?;
            sizes.push(index.deep_size());
        }
        sizes.sort_unstable();

        debug!(
            kind = kind.name(),
            samples = sizes.len(),
            min = sizes.first().copied().unwrap_or(0),
            max = sizes.last().copied().unwrap_or(0),
            "memory simulation complete"
        );

        Ok(MemoryProfile { kind, sizes })
    }
}

/// Percentile of ascending `values`, linearly interpolating between ranks.
///
/// Returns `None` for an empty slice or a percentile above 100.
pub fn percentile(values: &[usize], percentile: u8) -> Option<usize> {
    if values.is_empty() || percentile > 100 {
        return None;
    }

    let floating_index = f64::from(percentile) / 100.0 * (values.len() - 1) as f64;
    let index = floating_index as usize;
    let remainder = floating_index - index as f64;
    if remainder == 0.0 {
        return Some(values[index]);
    }

    let weighted = values[index] as f64 * (1.0 - remainder) + values[index + 1] as f64 * remainder;
    Some(weighted.round() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, 10)]
    #[test_case(50, 30)]
    #[test_case(100, 50)]
    #[test_case(25, 20)]
    #[test_case(10, 14)]
    fn percentile_interpolates(p: u8, expected: usize) {
        let values = [10, 20, 30, 40, 50];
        assert_eq!(percentile(&values, p), Some(expected));
    }

    #[test]
    fn percentile_of_nothing() {
        assert_eq!(percentile(&[], 50), None);
        assert_eq!(percentile(&[1], 101), None);
        assert_eq!(percentile(&[7], 99), Some(7));
    }

    #[test]
    fn simulation_is_sorted_and_reproducible() {
        let config = MonteCarloConfig::for_brackets(10)
            .with_samples(25)
            .with_highest_bracket_dollars(20_000)
            .with_seed(42);

        let first = MemoryAnalyzer::new(config.clone())
            .measure(CalculatorKind::Region)
            .unwrap();
        let second = MemoryAnalyzer::new(config).measure(CalculatorKind::Region).unwrap();

        assert_eq!(first.sizes.len(), 25);
        assert!(first.sizes.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(first.sizes, second.sizes);
        assert!(first.satisfies_bound(first.max()));
    }

    #[test]
    fn zero_samples_is_rejected() {
        let config = MonteCarloConfig::for_brackets(3).with_samples(0);
        assert!(matches!(
            MemoryAnalyzer::new(config).measure(CalculatorKind::Linear),
            Err(AnalyzerError::NoSamples)
        ));
    }
}
