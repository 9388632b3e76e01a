//! Volatility-spike prediction (compression before expansion)

use super::types::{finite, require, EvalError, Signal, SignalPayload, VolatilitySpike};
use crate::feed::Candle;
use crate::indicators::{atr, log_returns, std_dev, tail, true_ranges};

#[derive(Debug, Clone)]
pub struct VolatilityParams {
    pub min_candles: usize,
    pub atr_window: usize,
    pub short_window: usize,
    pub long_window: usize,
    /// Short/long volatility ratio below which the market is compressed
    pub compression_ratio: f64,
    /// Current true range over ATR that marks expansion
    pub expansion_multiple: f64,
}

impl Default for VolatilityParams {
    fn default() -> Self {
        Self {
            min_candles: 80,
            atr_window: 14,
            short_window: 20,
            long_window: 100,
            compression_ratio: 0.7,
            expansion_multiple: 1.5,
        }
    }
}

/// Predict a volatility spike from 1h candles
///
/// Fires when recent log-return dispersion is compressed relative to the
/// long-run level while the current candle's true range already exceeds
/// its ATR by `expansion_multiple`.
pub fn evaluate_volatility(
    symbol: &str,
    h1: &[Candle],
    params: &VolatilityParams,
) -> Result<Option<Signal>, EvalError> {
    require(h1.len(), params.min_candles)?;

    let ranges = true_ranges(h1);
    let current_tr = ranges.last().copied().unwrap_or(0.0);
    let atr = finite(
        atr(h1, params.atr_window).unwrap_or(0.0),
        "atr",
    )?;

    let closes: Vec<f64> = h1.iter().map(|c| c.close).collect();
    let returns = log_returns(&closes);
    let short_vol = std_dev(tail(&returns, params.short_window)).unwrap_or(0.0);
    let long_vol = std_dev(tail(&returns, params.long_window)).unwrap_or(0.0);

    let vol_ratio = if long_vol > 0.0 {
        finite(short_vol / long_vol, "volatility ratio")?
    } else {
        1.0
    };

    let spike_predicted =
        vol_ratio < params.compression_ratio && current_tr > params.expansion_multiple * atr;
    let confidence = if spike_predicted { 1.0 - vol_ratio } else { 0.0 };

    Ok(Some(Signal::new(
        symbol,
        confidence,
        SignalPayload::VolatilitySpike(VolatilitySpike {
            vol_ratio,
            atr,
            current_tr,
            spike_predicted,
        }),
    )))
}
