//! Shared numeric utilities
//!
//! Every evaluator takes its averages, dispersion and range measures from here.

mod range;
mod stats;

pub use range::{atr, ema, sma, true_ranges};
pub use stats::{
    change_over, correlation, log_returns, mean, pct_changes, std_dev, tail, z_score,
};
