//! Local-extrema level detection

use super::Level;
use crate::feed::Interval;
use std::cmp::Ordering;

/// Default extrema window, in samples on each side
pub const DEFAULT_WINDOW: usize = 5;

/// Default relative merge threshold (0.5%)
pub const DEFAULT_DELTA: f64 = 0.005;

/// Find support/resistance levels in a close series
///
/// A point is a local maximum when it is strictly greater than every other
/// point within `window` samples on both sides, and a local minimum when it
/// is strictly smaller. Only points with a full window on both sides are
/// candidates. The extrema are sorted ascending and merged greedily: a
/// candidate survives only if it lies more than `delta` (relative) above the
/// last survivor, so within a redundant band the lowest price wins.
///
/// Returns an empty ladder when `closes.len() < 2 * window` or `window == 0`.
pub fn find_levels(closes: &[f64], window: usize, delta: f64) -> Vec<f64> {
    if window == 0 || window.checked_mul(2).map_or(true, |span| closes.len() < span) {
        return Vec::new();
    }

    let mut extrema = Vec::new();
    for i in window..closes.len().saturating_sub(window) {
        let value = closes[i];
        let neighbours = closes[i - window..=i + window]
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != window)
            .map(|(_, v)| *v);

        let (mut is_max, mut is_min) = (true, true);
        for n in neighbours {
            is_max &= value > n;
            is_min &= value < n;
            if !is_max && !is_min {
                break;
            }
        }

        if is_max || is_min {
            extrema.push(value);
        }
    }

    extrema.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut levels: Vec<f64> = Vec::with_capacity(extrema.len());
    for candidate in extrema {
        match levels.last() {
            Some(&last) if (candidate - last).abs() <= delta * last.abs() => {}
            _ => levels.push(candidate),
        }
    }

    levels
}

/// Union of per-timeframe level ladders, sorted ascending
///
/// Identical prices collapse into one level listing every source timeframe.
/// Near-identical prices from different timeframes are kept apart: the
/// relative-distance merge is not reapplied across timeframes.
pub fn merge_timeframes(ladders: &[(Interval, Vec<f64>)]) -> Vec<Level> {
    let mut levels: Vec<Level> = ladders
        .iter()
        .flat_map(|(interval, prices)| {
            prices.iter().map(move |&price| Level {
                price,
                timeframes: vec![*interval],
            })
        })
        .collect();

    levels.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));

    let mut merged: Vec<Level> = Vec::with_capacity(levels.len());
    for level in levels {
        match merged.last_mut() {
            Some(last) if last.price == level.price => {
                for tf in level.timeframes {
                    if !last.timeframes.contains(&tf) {
                        last.timeframes.push(tf);
                    }
                }
            }
            _ => merged.push(level),
        }
    }

    merged
}
