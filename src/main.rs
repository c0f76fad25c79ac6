use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taxindex::brackets::generate_tax_brackets;
use taxindex::space::report::{
    format_count, format_dollars, memory_usage_table, section_heading, two_column_table,
    MemoryUsage,
};
use taxindex::space::{MemoryAnalyzer, MonteCarloConfig};
use taxindex::{
    CalculatorKind, DeepSize, Money, SampleDataset, TaxCalculator, TaxIndex, Validator,
    ValidatorConfig,
};

#[derive(Parser, Debug)]
#[command(name = "taxindex", about = "Constant-time progressive income tax indexes")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the tax owed on an income.
    Compute {
        /// Income, e.g. `10275`, `$1,234.56`.
        income: Money,
        /// Bracket schedule.
        #[arg(long, value_enum, default_value_t = SampleDataset::Texas)]
        dataset: SampleDataset,
        /// Calculator to use.
        #[arg(long, value_enum, default_value_t = CalculatorKind::Region)]
        kind: CalculatorKind,
    },
    /// Deep size of every quantized index for every sample dataset.
    Memory,
    /// Percentile memory as the highest-bracket lower bound grows.
    RangeScaling {
        /// Calculator to measure.
        #[arg(long, value_enum, default_value_t = CalculatorKind::Region)]
        kind: CalculatorKind,
        /// Random schedules per step.
        #[arg(long, default_value_t = 1_000)]
        samples: usize,
        /// Brackets per schedule.
        #[arg(long, default_value_t = 10)]
        brackets: usize,
        /// Reported percentile.
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
        percentile: u8,
        /// First highest-bracket lower bound, in dollars.
        #[arg(long, default_value_t = 200_000)]
        start: u32,
        /// Last highest-bracket lower bound, in dollars.
        #[arg(long, default_value_t = 1_000_000)]
        end: u32,
        /// Step between lower bounds, in dollars.
        #[arg(long, default_value_t = 50_000)]
        step: u32,
        /// RNG seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Percentile memory as the number of brackets grows.
    BracketScaling {
        /// Calculator to measure.
        #[arg(long, value_enum, default_value_t = CalculatorKind::Region)]
        kind: CalculatorKind,
        /// Random schedules per step.
        #[arg(long, default_value_t = 1_000)]
        samples: usize,
        /// Reported percentile.
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
        percentile: u8,
        /// Highest-bracket lower bound, in dollars.
        #[arg(long, default_value_t = 350_000)]
        highest: u32,
        /// First bracket count.
        #[arg(long, default_value_t = 5)]
        start: usize,
        /// Last bracket count.
        #[arg(long, default_value_t = 250)]
        end: usize,
        /// Step between bracket counts.
        #[arg(long, default_value_t = 5)]
        step: usize,
        /// RNG seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// 1st through 99th percentile memory for one configuration.
    Percentiles {
        /// Calculator to measure.
        #[arg(long, value_enum, default_value_t = CalculatorKind::Region)]
        kind: CalculatorKind,
        /// Random schedules.
        #[arg(long, default_value_t = 10_000)]
        samples: usize,
        /// Brackets per schedule.
        #[arg(long, default_value_t = 10)]
        brackets: usize,
        /// Highest-bracket lower bound, in dollars.
        #[arg(long, default_value_t = 350_000)]
        highest: u32,
        /// RNG seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Cross-check calculators against the linear reference.
    Validate {
        /// Calculator to check; every non-memorized kind when omitted.
        #[arg(long, value_enum)]
        kind: Option<CalculatorKind>,
        /// Generated schedules checked after the sample datasets.
        #[arg(long, default_value_t = 100)]
        schedules: usize,
        /// Brackets per generated schedule.
        #[arg(long, default_value_t = 10)]
        brackets: usize,
        /// Highest-bracket lower bound of generated schedules, in dollars.
        #[arg(long, default_value_t = 10_000)]
        highest: u32,
        /// RNG seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Compute {
            income,
            dataset,
            kind,
        } => run_compute(income, dataset, kind)?,
        Commands::Memory => run_memory()?,
        Commands::RangeScaling {
            kind,
            samples,
            brackets,
            percentile,
            start,
            end,
            step,
            seed,
        } => {
            ensure!(step > 0, "step must be positive");
            let heading = format!("{kind} tax range scaling with {brackets} brackets");
            let mut rows = Vec::new();
            for highest in (start..=end).step_by(step as usize) {
                let config = MonteCarloConfig::for_brackets(brackets)
                    .with_samples(samples)
                    .with_highest_bracket_dollars(highest)
                    .with_seed(seed);
                let bytes = measure_percentile(config, kind, percentile)?;
                rows.push((format_dollars(highest), format_count(bytes)));
            }
            print!("{}", section_heading(&heading));
            print!(
                "{}",
                two_column_table(
                    "Highest bracket",
                    &format!("Memory (bytes) - {percentile}th percentile"),
                    &rows
                )
            );
            println!();
        }
        Commands::BracketScaling {
            kind,
            samples,
            percentile,
            highest,
            start,
            end,
            step,
            seed,
        } => {
            ensure!(step > 0, "step must be positive");
            let heading = format!(
                "{kind} bracket scaling with brackets up to {}",
                format_dollars(highest)
            );
            let mut rows = Vec::new();
            for brackets in (start..=end).step_by(step) {
                let config = MonteCarloConfig::for_brackets(brackets)
                    .with_samples(samples)
                    .with_highest_bracket_dollars(highest)
                    .with_seed(seed);
                let bytes = measure_percentile(config, kind, percentile)?;
                rows.push((format_count(brackets), format_count(bytes)));
            }
            print!("{}", section_heading(&heading));
            print!(
                "{}",
                two_column_table(
                    "# Brackets",
                    &format!("Memory (bytes) - {percentile}th percentile"),
                    &rows
                )
            );
            println!();
        }
        Commands::Percentiles {
            kind,
            samples,
            brackets,
            highest,
            seed,
        } => {
            let config = MonteCarloConfig::for_brackets(brackets)
                .with_samples(samples)
                .with_highest_bracket_dollars(highest)
                .with_seed(seed);
            let profile = MemoryAnalyzer::new(config)
                .measure(kind)
                .with_context(|| format!("memory simulation failed for {kind}"))?;

            let title = format!(
                "{kind} percentile scaling with {brackets} brackets up to {}",
                format_dollars(highest)
            );
            let results: Vec<MemoryUsage> = (1..=99)
                .map(|p| MemoryUsage::new(p.to_string(), profile.percentile(p)))
                .collect();
            print!("{}", section_heading(&title));
            print!("{}", memory_usage_table(&title, "Percentile", &results));
            println!();
        }
        Commands::Validate {
            kind,
            schedules,
            brackets,
            highest,
            seed,
        } => run_validate(kind, schedules, brackets, highest, seed)?,
    }

    Ok(())
}

fn run_compute(income: Money, dataset: SampleDataset, kind: CalculatorKind) -> Result<()> {
    let schedule = dataset
        .schedule()
        .with_context(|| format!("invalid {} schedule", dataset.name()))?;
    let index = TaxIndex::build(kind, &schedule)
        .with_context(|| format!("failed to build {kind} index"))?;
    let tax = index
        .compute_tax(income)
        .with_context(|| format!("failed to compute tax on {income}"))?;

    println!("{tax}");
    Ok(())
}

fn run_memory() -> Result<()> {
    print!("{}", section_heading("Sample datasets:"));
    for dataset in SampleDataset::ALL {
        let schedule = dataset
            .schedule()
            .with_context(|| format!("invalid {} schedule", dataset.name()))?;
        let mut usages = Vec::with_capacity(CalculatorKind::QUANTIZED.len());
        for kind in CalculatorKind::QUANTIZED {
            let index = TaxIndex::build(kind, &schedule)
                .with_context(|| format!("failed to build {kind} index for {}", dataset.name()))?;
            usages.push(MemoryUsage::new(kind.name(), index.deep_size()));
        }
        print!(
            "{}",
            memory_usage_table(&format!("[{}]", dataset.name()), "Algorithm", &usages)
        );
        println!();
    }
    Ok(())
}

fn measure_percentile(config: MonteCarloConfig, kind: CalculatorKind, percentile: u8) -> Result<usize> {
    let highest = config.highest_bracket_dollars;
    let brackets = config.num_brackets;
    let profile = MemoryAnalyzer::new(config).measure(kind).with_context(|| {
        format!(
            "memory simulation failed for {kind} with {brackets} brackets up to {}",
            format_dollars(highest)
        )
    })?;
    Ok(profile.percentile(percentile))
}

fn run_validate(
    kind: Option<CalculatorKind>,
    schedules: usize,
    brackets: usize,
    highest: u32,
    seed: u64,
) -> Result<()> {
    let kinds: Vec<CalculatorKind> = match kind {
        Some(kind) => vec![kind],
        None => CalculatorKind::ALL
            .into_iter()
            .filter(|kind| *kind != CalculatorKind::Memorized)
            .collect(),
    };
    let validator = Validator::new(ValidatorConfig::default().with_seed(seed));

    for kind in kinds {
        let mut checked = 0;
        for dataset in SampleDataset::ALL {
            if kind == CalculatorKind::Memorized && dataset != SampleDataset::TinyRange {
                continue;
            }
            let schedule = dataset
                .schedule()
                .with_context(|| format!("invalid {} schedule", dataset.name()))?;
            let index = TaxIndex::build(kind, &schedule)
                .with_context(|| format!("failed to build {kind} index for {}", dataset.name()))?;
            checked += validator
                .validate(&index, &schedule)
                .with_context(|| format!("{kind} disagrees with linear on {}", dataset.name()))?
                .checked;
        }

        let mut rng = StdRng::seed_from_u64(seed);
        for sample in 0..schedules {
            let schedule = generate_tax_brackets(brackets, highest, &mut rng)
                .context("failed to generate a random schedule")?;
            let index = TaxIndex::build(kind, &schedule)
                .with_context(|| format!("failed to build {kind} index for schedule {sample}"))?;
            checked += validator
                .validate(&index, &schedule)
                .with_context(|| format!("{kind} disagrees with linear on schedule {sample}"))?
                .checked;
        }

        info!(kind = kind.name(), checked, "validation passed");
        println!("{kind}: {checked} incomes match the linear reference");
    }
    Ok(())
}
