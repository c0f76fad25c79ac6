//! Bracket schedules and the accumulated-bracket chain every index is built on.
//!
//! Data flow: `TaxBracket` list → validated `BracketSchedule` →
//! `AccumulatedChain` (cumulative tax before each bracket, forward links).

mod accumulated;
mod bracket;
pub mod generator;
mod samples;
mod schedule;

pub use accumulated::{AccumulatedBracket, AccumulatedChain, BracketId};
pub use bracket::TaxBracket;
pub use generator::{generate_tax_brackets, GeneratorError};
pub use samples::SampleDataset;
pub use schedule::{BracketSchedule, ScheduleError, MAX_BRACKETS};
