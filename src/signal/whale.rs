//! Whale activity detection from volume outliers

use super::types::{finite, require, EvalError, Signal, SignalPayload, WhaleActivity};
use crate::feed::Candle;
use crate::indicators::{mean, tail, z_score};

#[derive(Debug, Clone)]
pub struct WhaleParams {
    /// Minimum 15m history
    pub min_candles: usize,
    /// Sample size is `window * 6` candles, latest included
    pub window: usize,
    pub z_threshold: f64,
    /// Latest volume over sample mean that flags regardless of z-score
    pub volume_multiple: f64,
}

impl Default for WhaleParams {
    fn default() -> Self {
        Self {
            min_candles: 50,
            window: 10,
            z_threshold: 3.0,
            volume_multiple: 5.0,
        }
    }
}

/// Score the latest 15m volume against its recent distribution
///
/// Always returns an analysis once enough history exists; `whale_detected`
/// marks whether it crossed either threshold.
pub fn evaluate_whale(
    symbol: &str,
    m15: &[Candle],
    params: &WhaleParams,
) -> Result<Option<Signal>, EvalError> {
    require(m15.len(), params.min_candles)?;

    let volumes: Vec<f64> = m15.iter().map(|c| c.volume).collect();
    let sample = tail(&volumes, params.window * 6);
    let Some(latest) = m15.last() else {
        return Ok(None);
    };

    let z = finite(
        z_score(latest.volume, sample).unwrap_or(0.0),
        "volume z-score",
    )?;
    let mean_volume = mean(sample).unwrap_or(0.0);
    let volume_ratio = if mean_volume > 0.0 {
        finite(latest.volume / mean_volume, "volume ratio")?
    } else {
        0.0
    };
    let price_change = if latest.open > 0.0 {
        latest.close / latest.open - 1.0
    } else {
        0.0
    };

    let whale_detected = z > params.z_threshold || volume_ratio > params.volume_multiple;
    let confidence = (z.abs() / (2.0 * params.z_threshold)).min(1.0);

    Ok(Some(Signal::new(
        symbol,
        confidence,
        SignalPayload::WhaleActivity(WhaleActivity {
            z_score: z,
            volume_ratio,
            latest_volume: latest.volume,
            mean_volume,
            price_change,
            whale_detected,
        }),
    )))
}
