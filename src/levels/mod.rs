//! Support/resistance level detection
//!
//! Reduces local price extrema to a sparse, ascending ladder of levels

mod detector;

pub use detector::{find_levels, merge_timeframes, DEFAULT_DELTA, DEFAULT_WINDOW};

use crate::feed::{CandleSeries, Interval};
use serde::{Deserialize, Serialize};

/// A support/resistance price and the timeframes it was found on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: f64,
    pub timeframes: Vec<Interval>,
}

/// Run detection per timeframe and merge the ladders
pub fn detect_levels(series: &[(Interval, &CandleSeries)], window: usize, delta: f64) -> Vec<Level> {
    let ladders: Vec<(Interval, Vec<f64>)> = series
        .iter()
        .map(|(interval, s)| (*interval, find_levels(&s.closes(), window, delta)))
        .collect();

    merge_timeframes(&ladders)
}
