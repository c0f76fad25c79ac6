//! Space accounting and profiling
//!
//! Memory footprint is the quantity the quantized indexes trade against
//! query speed, so it is measured, not estimated:
//! - [`DeepSize`] reports inline + owned heap bytes of a built index
//! - [`MemoryAnalyzer`] runs Monte Carlo sweeps over random schedules
//! - [`report`] formats the results as console tables

mod analyzer;
pub mod report;

use std::mem;

pub use analyzer::{percentile, AnalyzerError, MemoryAnalyzer, MemoryProfile, MonteCarloConfig};

/// Deep memory size of a value in bytes.
pub trait DeepSize {
    /// Bytes owned on the heap (excluding the value itself).
    fn heap_size(&self) -> usize {
        0
    }

    /// Inline size plus owned heap bytes.
    fn deep_size(&self) -> usize
    where
        Self: Sized,
    {
        mem::size_of::<Self>() + self.heap_size()
    }
}

impl<T: DeepSize> DeepSize for Vec<T> {
    fn heap_size(&self) -> usize {
        self.capacity() * mem::size_of::<T>() + self.iter().map(DeepSize::heap_size).sum::<usize>()
    }
}

impl<T: DeepSize> DeepSize for Option<T> {
    fn heap_size(&self) -> usize {
        self.as_ref().map_or(0, DeepSize::heap_size)
    }
}

impl DeepSize for u32 {}
impl DeepSize for i64 {}
