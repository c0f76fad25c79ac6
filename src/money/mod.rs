//! Fixed-point money and rate types
//!
//! All tax arithmetic is exact integer arithmetic:
//! - `Money` counts cents and can never be negative
//! - `Percent` counts basis points (1/100 of a percent)
//! - `rate × amount` truncates toward zero, like real-world tax tables

mod amount;
mod percent;

pub use amount::{Money, MoneyError, CENTS_PER_DOLLAR};
pub use percent::{Percent, BASIS_POINTS_PER_100_PERCENT, BASIS_POINTS_PER_PERCENT};
