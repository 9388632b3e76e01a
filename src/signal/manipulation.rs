//! Market manipulation scoring on 5m candles

use super::types::{finite, require, EvalError, Manipulation, Signal, SignalPayload};
use crate::feed::Candle;
use crate::indicators::{correlation, mean, pct_changes};

#[derive(Debug, Clone)]
pub struct ManipulationParams {
    pub min_candles: usize,
    /// Candles used for correlation, volume and wick checks
    pub window: usize,
    /// Candles used for the body-ratio average
    pub body_window: usize,
    /// |correlation| below this means price ignores volume
    pub max_abs_correlation: f64,
    pub body_ratio_low: f64,
    pub body_ratio_high: f64,
    /// Latest volume over window average for high-volume-low-move
    pub volume_multiple: f64,
    /// Longest wick over body, and range over average range, for a stop hunt
    pub wick_multiple: f64,
    /// Score at which manipulation is flagged
    pub min_score: u8,
}

impl Default for ManipulationParams {
    fn default() -> Self {
        Self {
            min_candles: 100,
            window: 20,
            body_window: 10,
            max_abs_correlation: 0.3,
            body_ratio_low: 0.2,
            body_ratio_high: 0.8,
            volume_multiple: 2.0,
            wick_multiple: 2.0,
            min_score: 2,
        }
    }
}

/// Score 5m candles for manipulation patterns
///
/// One point each for: price/volume changes uncorrelated, a high-volume
/// candle that barely moved price, average body/range ratio outside the
/// normal band, and a stop-hunt wick on the latest candle.
pub fn evaluate_manipulation(
    symbol: &str,
    m5: &[Candle],
    params: &ManipulationParams,
) -> Result<Option<Signal>, EvalError> {
    require(m5.len(), params.min_candles.max(params.window + 1))?;

    let recent = &m5[m5.len() - params.window - 1..];
    let closes: Vec<f64> = recent.iter().map(|c| c.close).collect();
    let volumes: Vec<f64> = recent.iter().map(|c| c.volume).collect();
    let price_changes = pct_changes(&closes);
    let volume_changes = pct_changes(&volumes);

    let corr = finite(
        correlation(&price_changes, &volume_changes).unwrap_or(0.0),
        "price/volume correlation",
    )?;
    let uncorrelated = corr.abs() < params.max_abs_correlation;

    let window = &recent[1..];
    let Some(latest) = window.last() else {
        return Ok(None);
    };
    let avg_volume = mean(&volumes[1..]).unwrap_or(0.0);
    let volume_ratio = if avg_volume > 0.0 {
        latest.volume / avg_volume
    } else {
        0.0
    };
    let abs_moves: Vec<f64> = price_changes.iter().map(|c| c.abs()).collect();
    let latest_move = abs_moves.last().copied().unwrap_or(0.0);
    let high_volume_low_move = volume_ratio > params.volume_multiple
        && latest_move < mean(&abs_moves).unwrap_or(0.0);

    let body_ratios: Vec<f64> = m5[m5.len() - params.body_window..]
        .iter()
        .map(|c| {
            let range = c.range();
            if range > 0.0 {
                c.body() / range
            } else {
                0.0
            }
        })
        .collect();
    let body_ratio = finite(mean(&body_ratios).unwrap_or(0.0), "body ratio")?;
    let abnormal_bodies = body_ratio < params.body_ratio_low || body_ratio > params.body_ratio_high;

    let avg_range = mean(&window.iter().map(Candle::range).collect::<Vec<_>>()).unwrap_or(0.0);
    let upper_wick = latest.high - latest.open.max(latest.close);
    let lower_wick = latest.open.min(latest.close) - latest.low;
    let stop_hunt = upper_wick.max(lower_wick) > params.wick_multiple * latest.body()
        && latest.range() > params.wick_multiple * avg_range;

    let manipulation_score = [uncorrelated, high_volume_low_move, abnormal_bodies, stop_hunt]
        .iter()
        .filter(|hit| **hit)
        .count() as u8;
    let manipulation_detected = manipulation_score >= params.min_score;

    tracing::trace!(
        symbol,
        corr,
        body_ratio,
        volume_ratio,
        manipulation_score,
        "Manipulation score"
    );

    Ok(Some(Signal::new(
        symbol,
        f64::from(manipulation_score) / 4.0,
        SignalPayload::Manipulation(Manipulation {
            manipulation_score,
            correlation: corr,
            body_ratio,
            volume_ratio,
            manipulation_detected,
        }),
    )))
}
