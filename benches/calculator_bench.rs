//! Query and construction benchmarks for every calculator kind

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use taxindex::{CalculatorKind, Money, SampleDataset, TaxCalculator, TaxIndex};

const QUERIES: usize = 1_024;

fn incomes(max_cents: i64) -> Vec<Money> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..QUERIES)
        .filter_map(|_| Money::of_cents(rng.gen_range(0..max_cents)).ok())
        .collect()
}

fn bench_compute_tax(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_tax");

    for dataset in [SampleDataset::Texas, SampleDataset::Hawaii] {
        let schedule = dataset.schedule().expect("sample schedule is valid");
        // Mostly below the highest bracket, some above.
        let queries = incomes(schedule.range() * 5 / 4);

        for kind in CalculatorKind::ALL {
            if kind == CalculatorKind::Memorized {
                continue;
            }
            let index = TaxIndex::build(kind, &schedule).expect("index builds");
            group.bench_with_input(
                BenchmarkId::new(kind.name(), dataset.name()),
                &queries,
                |b, queries| {
                    b.iter(|| {
                        for &income in queries {
                            black_box(index.compute_tax(black_box(income)).ok());
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");
    let schedule = SampleDataset::Texas.schedule().expect("sample schedule is valid");

    for kind in CalculatorKind::QUANTIZED {
        group.bench_function(BenchmarkId::from_parameter(kind.name()), |b| {
            b.iter(|| black_box(TaxIndex::build(kind, black_box(&schedule)).ok()));
        });
    }

    let tiny = SampleDataset::TinyRange.schedule().expect("sample schedule is valid");
    group.bench_function(BenchmarkId::new("memorized", "tiny-range"), |b| {
        b.iter(|| black_box(TaxIndex::build(CalculatorKind::Memorized, black_box(&tiny)).ok()));
    });

    group.finish();
}

criterion_group!(benches, bench_compute_tax, bench_construction);
criterion_main!(benches);
