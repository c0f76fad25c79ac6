use crate::brackets::{BracketSchedule, ScheduleError};
use crate::money::{Money, Percent};

/// Built-in bracket schedules used by the CLI, tests and benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SampleDataset {
    /// 2022 federal brackets for a single filer (Texas has no state income tax).
    Texas,
    /// 2022 combined Hawaii state and federal brackets.
    Hawaii,
    /// Same shape as `Texas` with the highest bracket starting at $5,399, small
    /// enough for the cent-granular index.
    TinyRange,
}

impl SampleDataset {
    /// Every built-in dataset.
    pub const ALL: [SampleDataset; 3] = [
        SampleDataset::Texas,
        SampleDataset::Hawaii,
        SampleDataset::TinyRange,
    ];

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            SampleDataset::Texas => "texas",
            SampleDataset::Hawaii => "hawaii",
            SampleDataset::TinyRange => "tiny-range",
        }
    }

    /// Build the validated schedule.
    pub fn schedule(self) -> Result<BracketSchedule, ScheduleError> {
        BracketSchedule::from_lower_bounds(&self.lower_bounds())
    }

    fn lower_bounds(self) -> Vec<(Percent, Money)> {
        let pct = Percent::percent;
        let bps = Percent::basis_points;
        let usd = Money::dollars;

        match self {
            SampleDataset::Texas => vec![
                (pct(10), usd(0)),
                (pct(12), usd(10_275)),
                (pct(22), usd(41_775)),
                (pct(24), usd(89_075)),
                (pct(32), usd(170_050)),
                (pct(35), usd(215_950)),
                (pct(37), usd(539_900)),
            ],
            SampleDataset::Hawaii => vec![
                (bps(11_40), usd(0)),
                (bps(13_20), usd(2_400)),
                (bps(15_50), usd(4_800)),
                (bps(16_40), usd(9_600)),
                (bps(18_40), usd(10_275)),
                (bps(18_80), usd(14_400)),
                (bps(19_20), usd(19_200)),
                (bps(19_60), usd(24_000)),
                (bps(19_90), usd(36_000)),
                (bps(29_90), usd(41_775)),
                (bps(30_25), usd(48_000)),
                (bps(32_25), usd(89_075)),
                (bps(33_00), usd(150_000)),
                (bps(41_00), usd(170_050)),
                (bps(42_00), usd(175_000)),
                (bps(43_00), usd(200_000)),
                (bps(46_00), usd(215_950)),
                (bps(48_00), usd(539_900)),
            ],
            SampleDataset::TinyRange => vec![
                (pct(10), usd(0)),
                (pct(12), usd(102)),
                (pct(22), usd(417)),
                (pct(24), usd(890)),
                (pct(32), usd(1_700)),
                (pct(35), usd(2_159)),
                (pct(37), usd(5_399)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_samples_are_valid() {
        for dataset in SampleDataset::ALL {
            let schedule = dataset.schedule().unwrap();
            assert!(schedule.len() >= 7, "{} too small", dataset.name());
        }
    }

    #[test]
    fn tiny_range_stays_tiny() {
        let schedule = SampleDataset::TinyRange.schedule().unwrap();
        assert_eq!(schedule.range(), 539_900);
    }
}
